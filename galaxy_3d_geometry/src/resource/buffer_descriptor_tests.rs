/// Unit tests for buffer_descriptor.rs
///
/// Tests Attribute metadata, descriptor state transitions and the update
/// strategy decision.

#[cfg(test)]
use crate::graphics_device::{BufferHandle, BufferTarget, BufferUsage, ElementType};
#[cfg(test)]
use crate::resource::{
    Attribute, BufferDescriptor, BufferState, Residency, TypedBuffer, UpdateStrategy,
    choose_update_strategy,
};

// ============================================================================
// HELPERS
// ============================================================================

fn handle(index: u64) -> BufferHandle {
    slotmap::KeyData::from_ffi(index).into()
}

fn normals_descriptor() -> BufferDescriptor {
    let mut descriptor = BufferDescriptor::new(Attribute::Normals, BufferUsage::Dynamic);
    descriptor.attach_buffer(TypedBuffer::from(vec![0.0f32, 0.0, 1.0]));
    descriptor
}

// ============================================================================
// ATTRIBUTE
// ============================================================================

#[test]
fn test_attribute_metadata() {
    assert_eq!(Attribute::Vertices.components_per_vertex(), Some(3));
    assert_eq!(Attribute::Normals.components_per_vertex(), Some(3));
    assert_eq!(Attribute::TextureCoords.components_per_vertex(), Some(2));
    assert_eq!(Attribute::Colors.components_per_vertex(), Some(4));
    assert_eq!(Attribute::Indices.components_per_vertex(), None);

    for attribute in Attribute::ALL {
        let expected = if attribute == Attribute::Indices { ElementType::Int } else { ElementType::Float };
        assert_eq!(attribute.element_type(), expected);
    }
    assert_eq!(Attribute::Indices.target(), BufferTarget::Index);
    assert_eq!(Attribute::Colors.target(), BufferTarget::Vertex);
}

#[test]
fn test_attribute_slots_are_distinct() {
    let mut slots: Vec<usize> = Attribute::ALL.iter().map(|a| a.index()).collect();
    slots.sort();
    assert_eq!(slots, vec![0, 1, 2, 3, 4]);
    assert_eq!(format!("{}", Attribute::TextureCoords), "texture coords");
}

// ============================================================================
// STATE TRANSITIONS
// ============================================================================

#[test]
fn test_new_descriptor_is_empty() {
    let descriptor = BufferDescriptor::new(Attribute::Vertices, BufferUsage::Static);
    assert_eq!(descriptor.state(), BufferState::Empty);
    assert_eq!(descriptor.element_count(), 0);
    assert!(descriptor.handle().is_none());
    assert!(!descriptor.has_cpu_copy());
    assert_eq!(descriptor.element_type(), ElementType::Float);
}

#[test]
fn test_attach_then_upload() {
    let mut descriptor = normals_descriptor();
    assert_eq!(descriptor.state(), BufferState::CpuOnly);
    assert_eq!(descriptor.element_count(), 3);

    descriptor.mark_resident(handle(1), 3);
    assert_eq!(descriptor.state(), BufferState::Uploaded);
    assert_eq!(descriptor.handle(), Some(handle(1)));
    assert_eq!(descriptor.device_capacity(), 3);
}

#[test]
fn test_discard_keeps_handle_and_count() {
    let mut descriptor = normals_descriptor();
    descriptor.mark_resident(handle(1), 3);
    descriptor.discard_cpu_copy();

    assert_eq!(descriptor.state(), BufferState::Uploaded);
    assert!(descriptor.handle().is_some());
    assert_eq!(descriptor.element_count(), 3);
    assert!(descriptor.buffer().is_none());
}

#[test]
fn test_restore_cpu_copy_is_zero_filled_and_idempotent() {
    let mut descriptor = normals_descriptor();
    descriptor.mark_resident(handle(1), 3);
    descriptor.discard_cpu_copy();

    assert!(descriptor.restore_cpu_copy());
    let restored = descriptor.buffer().unwrap().clone();
    assert_eq!(restored.as_float().unwrap().as_slice(), &[0.0, 0.0, 0.0]);

    assert!(!descriptor.restore_cpu_copy());
    assert_eq!(descriptor.buffer(), Some(&restored));
}

#[test]
fn test_restore_on_empty_descriptor_does_nothing() {
    let mut descriptor = BufferDescriptor::new(Attribute::Colors, BufferUsage::Static);
    assert!(!descriptor.restore_cpu_copy());
    assert_eq!(descriptor.state(), BufferState::Empty);
}

#[test]
fn test_invalidate_clears_handle_keeps_cpu_data() {
    let mut descriptor = normals_descriptor();
    descriptor.mark_resident(handle(1), 3);

    assert!(descriptor.invalidate());
    assert_eq!(descriptor.state(), BufferState::Stale);
    assert_eq!(descriptor.residency(), Residency::Invalidated);
    assert!(descriptor.handle().is_none());
    assert!(descriptor.has_cpu_copy());

    // Nothing left to invalidate
    assert!(!descriptor.invalidate());
}

#[test]
fn test_take_handle_and_reset() {
    let mut descriptor = normals_descriptor();
    descriptor.mark_resident(handle(2), 3);

    assert_eq!(descriptor.take_handle(), Some(handle(2)));
    assert_eq!(descriptor.state(), BufferState::CpuOnly);
    assert_eq!(descriptor.take_handle(), None);

    descriptor.reset();
    assert_eq!(descriptor.state(), BufferState::Empty);
    assert_eq!(descriptor.element_count(), 0);
}

#[test]
fn test_display_mentions_state_and_usage() {
    let mut descriptor = normals_descriptor();
    descriptor.mark_resident(handle(1), 3);
    let text = format!("{}", descriptor);
    assert!(text.contains("normals"));
    assert!(text.contains("Dynamic"));
    assert!(text.contains("Uploaded"));
    assert!(text.contains("handle="));

    let empty = format!("{}", BufferDescriptor::new(Attribute::Indices, BufferUsage::Static));
    assert!(empty.contains("Empty"));
}

// ============================================================================
// UPDATE STRATEGY
// ============================================================================

#[test]
fn test_update_strategy_without_handle_reallocates() {
    assert_eq!(choose_update_strategy(0, 12, false), UpdateStrategy::Reallocate);
    assert_eq!(choose_update_strategy(100, 12, false), UpdateStrategy::Reallocate);
}

#[test]
fn test_update_strategy_same_size_in_place() {
    assert_eq!(choose_update_strategy(12, 12, true), UpdateStrategy::PartialUpdate);
}

#[test]
fn test_update_strategy_shrink_reallocates() {
    assert_eq!(choose_update_strategy(12, 6, true), UpdateStrategy::Reallocate);
    assert_eq!(choose_update_strategy(12, 11, true), UpdateStrategy::Reallocate);
}

#[test]
fn test_update_strategy_growth_reallocates() {
    assert_eq!(choose_update_strategy(12, 13, true), UpdateStrategy::Reallocate);
    assert_eq!(choose_update_strategy(12, 0, true), UpdateStrategy::Reallocate);
}
