use common::DocumentId;
use thiserror::Error;

/// A document source could not produce its documents.
#[derive(Error, Debug)]
#[error("Document source {source_name} failed: {reason}")]
pub struct SourceError {
    pub source_name: String,
    pub reason: String,
}

/// The asset loader could not load a script or build a template manager.
#[derive(Error, Debug)]
#[error("Failed to load {asset}: {reason}")]
pub struct LoadError {
    pub asset: String,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum PageError {
    #[error("Document manager instantiation failed: {0}")]
    ManagerInstantiation(#[source] LoadError),

    #[error("Document rendering capability import failed: {0}")]
    CapabilityImport(#[source] LoadError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Rendering documents failed: {0}")]
    Render(#[source] LoadError),

    #[error("Landing page bootstrap already started")]
    AlreadyBootstrapped,

    #[error("Control #{0} is missing from the page")]
    MissingControl(String),

    #[error("Unknown document: {0}")]
    UnknownDocument(DocumentId),
}
