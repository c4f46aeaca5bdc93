//! Conversion of graph-level types into their Vulkan counterparts.

/// Convert an object into a vulkan type
pub trait IntoVulkanType {
    /// Output Vulkan type
    type Output;

    /// Consume self and return the vulkan equivalent
    fn into_vulkan(self) -> Self::Output;
}
