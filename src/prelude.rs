pub use crate::data_structs::assay::AssayData;
pub use crate::data_structs::extension::{
    downcast_slot,
    AxisPairs,
    AxisVector,
    ExtensionSlot,
    LinkedMatrix,
};
pub use crate::data_structs::frame::{
    AssayFrame,
    AssayFrameBuilder,
    AssayKey,
    AssayView,
    BindChecks,
};
pub use crate::data_structs::{
    resolve_selector,
    Axis,
    AxisLink,
    MetaFrame,
    Selector,
    SlotRole,
};
pub use crate::error::{
    AssayFrameError,
    Result,
};
