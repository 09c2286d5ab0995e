pub mod principal;
pub mod resolver;
pub mod token;

pub use principal::{AccountStatus, Principal, Role};
pub use resolver::{PrincipalResolver, ResolveError};
pub use token::{Claims, TokenCodec, TokenError};
