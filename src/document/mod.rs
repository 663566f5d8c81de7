//! Pure document layer: line composition, the PDF writer and the ZIP
//! archiver. Nothing here touches the store or performs I/O, so rendering
//! may run concurrently across annexes.

pub mod pdf;
pub mod render;
pub mod zip;
