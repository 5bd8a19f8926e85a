pub mod affordance;
pub mod bus;
pub mod capability;
pub mod config;
pub mod error;
pub mod headless;
pub mod listeners;
pub mod manager;
pub mod page;
pub mod popup;
pub mod source;

pub use affordance::{AddAffordance, Control, Page};
pub use bus::{AuthCheck, SessionAuth, SignalBus, Subscription};
pub use capability::{AssetLoader, Instantiator, TemplateFactory, TemplateManager};
pub use config::PageConfig;
pub use error::{LoadError, PageError, SourceError};
pub use manager::DocumentManager;
pub use page::{LandingPage, PageDeps, Phase};
pub use popup::{ChannelPopups, PopupDispatch, PopupIntent, RecordingPopups};
pub use source::{DocumentSource, StubSource};
