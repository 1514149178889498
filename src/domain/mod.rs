pub mod input;
pub mod outcome;
pub mod response;
pub mod state;

pub use input::{InputRef, RawData, ResolvedInput};
pub use outcome::{content_digest, FetchOutcome};
pub use response::Response;
pub use state::{Validators, WatchState};
