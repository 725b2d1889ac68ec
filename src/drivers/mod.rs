// src/drivers/mod.rs
// 声明同级目录下的子模块文件
pub mod codec;
pub mod error;
pub mod excitation;
pub mod link;
pub mod store;
pub mod transport;
pub mod view;
// 公开导出这些模块里的结构体，方便外部调用
pub use codec::{decode, Channel, Triplet};
pub use error::TickError;
pub use excitation::{ExcitationController, ExcitationMode, Variant};
pub use link::DeviceLink;
pub use store::SampleStore;
pub use transport::{SerialBackend, SystemSerial};
pub use view::{Bounds, ViewState, ViewTransform, Viewport, ADC_ORIGIN};
