mod memory_store;
mod trait_def;
mod webdav;

pub use memory_store::MemoryBlobStore;
pub use trait_def::{Blob, BlobStore, StoreError, WritePrecondition};
pub use webdav::{WebDavBlobStore, WebDavConfig};
