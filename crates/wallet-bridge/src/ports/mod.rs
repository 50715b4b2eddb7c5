pub mod outbound;

pub use outbound::{ObjectRef, RpcClient, RpcError};
