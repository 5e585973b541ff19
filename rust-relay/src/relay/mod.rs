//! Subscription filtering and fan-out.
//!
//! ```text
//! Vec<Entry> → Dispatcher → matches(service, item) → Deliverer (http | rpc) → DispatchReport
//! ```

pub mod deliver;
pub mod dispatcher;
pub mod filter;

pub use deliver::{Deliverer, HttpDeliverer, JsonRpcClient, RpcDeliverer, RpcRegistry};
pub use dispatcher::{DispatchOutcome, DispatchReport, Dispatcher};
pub use filter::{matches, FieldTable};
