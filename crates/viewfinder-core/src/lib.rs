//! Viewfinder Core - Image crop/transform engine
//!
//! This crate provides the geometry and rasterization behind Viewfinder's
//! crop editor: affine pan/zoom/rotate over a fixed crop viewport, the
//! cover-fit invariant that keeps the viewport filled, and the export
//! pipeline that rasterizes and encodes the cropped pixels.
//!
//! # Architecture
//!
//! - [`transform`] - affine matrix algebra, cover/fit math, pan clamping
//! - [`editor`] - the interaction controller owning the live transform
//! - [`export`] - viewport → output raster → encoded bytes
//! - [`decode`] - EXIF-aware bitmap decoding
//! - [`services`] - injected capability traits for loading and persistence
//!
//! All geometry is synchronous, pure, and single-threaded; in a
//! multi-threaded host, wrap [`editor::CropEditor`] in an exclusive-writer
//! mechanism so intermediate states are never observed.

pub mod decode;
pub mod editor;
pub mod export;
pub mod raster;
pub mod services;
pub mod transform;

pub use decode::{decode_bitmap, DecodeError, Orientation};
pub use editor::{CropEditor, EditorConfig};
pub use export::{
    export, Background, ExportError, ExportFormat, ExportOptions, ExportResult, ResampleFilter,
    SourceRect,
};
pub use raster::Raster;
pub use services::{BitmapLoader, BlobStore, BlobStoreError, ExifBitmapLoader, MemoryBlobStore};
pub use transform::{
    clamp_pan_to_cover, fit_to_crop, min_cover_scale, rotated_extents, DegenerateTransformError,
    Mat2D, Size, Transform,
};
