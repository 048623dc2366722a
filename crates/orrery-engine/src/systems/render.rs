use crate::components::entity::Entity;
use crate::renderer::instance::{RenderBuffer, RenderInstance};

fn to_instance(entity: &Entity) -> Option<RenderInstance> {
    let mesh = entity.mesh.as_ref()?;
    let [param_a, param_b] = mesh.shape.params();
    Some(RenderInstance {
        x: entity.pos.x,
        y: entity.pos.y,
        z: entity.pos.z,
        qx: entity.rotation.x,
        qy: entity.rotation.y,
        qz: entity.rotation.z,
        qw: entity.rotation.w,
        sx: entity.scale.x,
        sy: entity.scale.y,
        sz: entity.scale.z,
        r: mesh.color.r,
        g: mesh.color.g,
        b: mesh.color.b,
        opacity: mesh.opacity,
        emissive: mesh.emissive,
        shape: mesh.shape.code(),
        param_a,
        param_b,
        texture: mesh.texture.map(|t| t.0 as f32).unwrap_or(-1.0),
        _pad: 0.0,
    })
}

/// Build the render buffer from a set of entities.
/// Opaque meshes first, then translucent ones; `translucent_split` marks the boundary.
pub fn build_render_buffer<'a>(entities: impl Iterator<Item = &'a Entity>, buffer: &mut RenderBuffer) {
    buffer.clear();

    let mut translucent: Vec<RenderInstance> = Vec::new();
    let mut dropped = 0usize;

    for entity in entities {
        if !entity.active {
            continue;
        }
        let Some(instance) = to_instance(entity) else { continue };

        if instance.opacity < 1.0 {
            translucent.push(instance);
        } else if !buffer.push(instance) {
            dropped += 1;
        }
    }

    buffer.set_translucent_split(buffer.instance_count());
    for instance in translucent {
        if !buffer.push(instance) {
            dropped += 1;
        }
    }

    if dropped > 0 {
        log::warn!("render buffer full, {dropped} instances dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntityId;
    use crate::components::mesh::{Color, MeshComponent, TextureSlot};
    use glam::Vec3;

    #[test]
    fn opaque_meshes_come_first() {
        let entities = vec![
            Entity::new(EntityId(1))
                .with_mesh(MeshComponent::sphere(1.0, Color::WHITE).with_opacity(0.4)),
            Entity::new(EntityId(2))
                .with_pos(Vec3::new(3.0, 0.0, 0.0))
                .with_mesh(MeshComponent::sphere(0.2, Color::WHITE)),
            Entity::new(EntityId(3)).with_mesh(MeshComponent::sphere(0.5, Color::WHITE)),
        ];

        let mut buffer = RenderBuffer::new();
        build_render_buffer(entities.iter(), &mut buffer);

        assert_eq!(buffer.instance_count(), 3);
        assert_eq!(buffer.translucent_split, 2);
        assert_eq!(buffer.instances[0].x, 3.0);
        assert_eq!(buffer.instances[2].opacity, 0.4);
    }

    #[test]
    fn inactive_and_meshless_entities_are_skipped() {
        let entities = vec![
            Entity::new(EntityId(1)).with_mesh(MeshComponent::default()).inactive(),
            Entity::new(EntityId(2)),
        ];
        let mut buffer = RenderBuffer::new();
        build_render_buffer(entities.iter(), &mut buffer);
        assert_eq!(buffer.instance_count(), 0);
    }

    #[test]
    fn texture_slot_is_packed() {
        let entities = vec![
            Entity::new(EntityId(1)).with_mesh(MeshComponent::default().with_texture(TextureSlot(5))),
            Entity::new(EntityId(2)).with_mesh(MeshComponent::default()),
        ];
        let mut buffer = RenderBuffer::new();
        build_render_buffer(entities.iter(), &mut buffer);
        assert_eq!(buffer.instances[0].texture, 5.0);
        assert_eq!(buffer.instances[1].texture, -1.0);
    }
}
