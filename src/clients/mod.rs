pub mod aihehuo;

pub use aihehuo::{AihehuoRemote, Upstream, UpstreamRequest};
