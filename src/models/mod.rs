pub mod content;
pub mod money;
pub mod order;
pub mod pricing;
pub mod profile;
pub mod topup;

pub use content::{Banner, Post};
pub use order::{Order, OrderStatus, PayMethod};
pub use pricing::{MarkupType, PackageSetting, ProductSetting};
pub use profile::Profile;
pub use topup::Topup;
