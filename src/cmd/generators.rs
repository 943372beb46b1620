//! Generators command: list the value generator catalog.

use relgen::fake::FakeKind;

pub fn run() {
    println!("{:<16} DESCRIPTION", "NAME");
    println!("{}", "─".repeat(72));
    for kind in FakeKind::ALL {
        println!("{:<16} {}", kind.as_str(), kind.description());
    }
}
