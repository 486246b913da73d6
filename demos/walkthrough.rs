use std::{io::Read, ptr};

use brkalloc::{BrkAllocator, Sbrk};

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`, `htop`,
/// `gdb`, or just visually track how allocations change the program break.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn print_program_break(
  label: &str,
  allocator: &BrkAllocator<Sbrk>,
) {
  println!(
    "[{}] PID = {}, program break = {:?}, {}",
    label,
    std::process::id(),
    allocator.current_break(),
    allocator.stats(),
  );
}

fn print_alloc(
  size: usize,
  address: *mut u8,
  allocator: &BrkAllocator<Sbrk>,
) {
  println!(
    "Allocated {} bytes, address = {:?}, program break = {:?}",
    size,
    address,
    allocator.current_break()
  );
}

fn main() {
  // The only owner of the process break in this program. The std allocator
  // keeps serving Vec, String and friends on its own heap.
  let allocator = BrkAllocator::new(Sbrk);

  print_program_break("start", &allocator);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Three blocks carved back to back from the break.
  // --------------------------------------------------------------------
  let first = allocator.allocate(10);
  println!("\n[1] Allocate 10 bytes");
  print_alloc(10, first, &allocator);

  let second = allocator.allocate(20);
  println!("[1] Allocate 20 bytes");
  print_alloc(20, second, &allocator);

  let third = allocator.allocate(64);
  println!("[1] Allocate 64 bytes");
  print_alloc(64, third, &allocator);

  unsafe { ptr::write_bytes(third, 0xAB, 64) };
  println!("[1] Initialized third block with 0xAB");

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Free a block in the middle. It is not at the break, so it is only
  //    marked free and the break stays where it is.
  // --------------------------------------------------------------------
  unsafe { allocator.deallocate(second) };
  println!("\n[2] Deallocated second block at {:?}", second);
  print_program_break("after middle free", &allocator);

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) A smaller request is served from the freed block (first fit).
  // --------------------------------------------------------------------
  let reused = allocator.allocate(12);
  println!("\n[3] Allocate 12 bytes (check reuse of freed block)");
  print_alloc(12, reused, &allocator);

  println!(
    "[3] reused == second? {}",
    if reused == second {
      "Yes, it reused the freed block"
    } else {
      "No, it allocated somewhere else"
    }
  );

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) Free everything in reverse order. Each block is at the break when it
  //    is freed, so the break walks all the way back.
  // --------------------------------------------------------------------
  unsafe {
    allocator.deallocate(third);
    print_program_break("after freeing third", &allocator);

    allocator.deallocate(reused);
    print_program_break("after freeing reused", &allocator);

    allocator.deallocate(first);
    print_program_break("after freeing first", &allocator);
  }

  // --------------------------------------------------------------------
  // 5) Zero sized requests never touch the heap.
  // --------------------------------------------------------------------
  println!("\n[5] allocate(0) = {:?}", allocator.allocate(0));

  println!("\n[6] End of example.");
}
