pub mod overlap;
pub mod projector;
pub mod rebuild;
pub mod scanner;
pub mod traverse;

pub use overlap::overlap_length;
pub use projector::{move_to_run_space, run_mutations};
pub use rebuild::build_text_from_mutations;
pub use scanner::{Scan, scan};
pub use traverse::{collect_variables, fill_document};
