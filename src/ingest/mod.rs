pub mod poller;
pub mod upstream;

pub use poller::{LivePoller, TickSummary};
pub use upstream::{EspnUpstream, Upstream};
