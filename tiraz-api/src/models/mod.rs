//! Request, response and record types for tiraz-api

pub mod catalog;
pub mod measurement;

pub use catalog::{
    CatalogEntity, Category, CategoryInput, CategoryPatch, Color, ColorInput, ColorPatch, Design,
    DesignInput, DesignPatch, Fabric, FabricInput, FabricPatch,
};
pub use measurement::{
    MeasurementMetadata, MeasurementSource, Measurements, ProcessData, ProcessDebug,
    ProcessErrorInfo, ProcessRequest, ProcessResponse, UploadResponse,
};
