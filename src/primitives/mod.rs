pub mod budget;
pub mod funcs;
pub mod traits;

pub use budget::RequestBudget;
pub use traits::{
    Chain, ClientStateInfo, ConnectionHandshake, ConnectionInfo, Header, IbcProvider,
    KeyProvider, TxResult, TxSearch,
};
