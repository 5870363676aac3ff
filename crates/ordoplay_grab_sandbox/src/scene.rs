// SPDX-License-Identifier: MIT OR Apache-2.0
//! Demo scene: a player facing a table with props on it.

use crate::error::Result;
use glam::Vec3;
use ordoplay_grab::world::{BodyDesc, ColliderDesc, ColliderShape, PhysicsWorld};
use ordoplay_grab::{EntityId, Interaction};

/// Named grabbable prop
#[derive(Debug, Clone)]
pub struct Prop {
    /// Display name used in logs
    pub name: String,
    /// Entity in the world
    pub entity: EntityId,
}

/// Physics world populated with the demo layout
#[derive(Debug)]
pub struct DemoScene {
    /// Simulation
    pub world: PhysicsWorld,
    /// Player body, on the holder layer
    pub player: EntityId,
    /// Grabbable props
    pub props: Vec<Prop>,
}

impl DemoScene {
    /// Build the scene with the player standing at `player_position`
    pub fn build(gravity: Vec3, player_position: Vec3, holder_layer: u8) -> Self {
        let mut world = PhysicsWorld::with_gravity(gravity);

        let floor = EntityId::new();
        world.add_body(floor, BodyDesc::fixed(Vec3::new(0.0, -0.5, 0.0)));
        world.add_collider(floor, ColliderDesc::cuboid(Vec3::new(40.0, 1.0, 40.0)));

        let table = EntityId::new();
        world.add_body(table, BodyDesc::fixed(player_position + Vec3::new(0.0, 0.6, -2.0)));
        world.add_collider(table, ColliderDesc::cuboid(Vec3::new(1.5, 1.2, 2.0)));

        let player = EntityId::new();
        world.add_body(player, BodyDesc::kinematic(player_position));
        world.add_collider(
            player,
            ColliderDesc {
                shape: ColliderShape::Sphere {
                    radius: 0.4,
                    center: Vec3::new(0.0, 1.0, 0.0),
                },
                ..ColliderDesc::sphere(0.4).on_layer(holder_layer)
            },
        );

        let mut props = Vec::new();
        let mut add_prop = |name: &str, offset: Vec3, mass: f32, collider: ColliderDesc| {
            let entity = EntityId::new();
            world.add_body(
                entity,
                BodyDesc {
                    mass,
                    linear_damping: 0.05,
                    ..BodyDesc::dynamic(player_position + offset)
                },
            );
            world.add_collider(entity, collider);
            props.push(Prop {
                name: name.to_string(),
                entity,
            });
        };

        add_prop(
            "crate",
            Vec3::new(0.0, 1.45, -1.8),
            4.0,
            ColliderDesc::cuboid(Vec3::splat(0.5)),
        );
        add_prop(
            "ball",
            Vec3::new(0.0, 1.45, -2.6),
            1.0,
            ColliderDesc {
                bounciness: 0.6,
                ..ColliderDesc::sphere(0.25)
            },
        );

        tracing::debug!("Built demo scene with {} props", props.len());
        Self {
            world,
            player,
            props,
        }
    }

    /// Make every prop grabbable
    pub fn register_props(&self, interaction: &mut Interaction) -> Result<()> {
        for prop in &self.props {
            interaction.register(prop.entity, &self.world)?;
        }
        Ok(())
    }

    /// Display name of `entity`
    pub fn name_of(&self, entity: EntityId) -> &str {
        self.props
            .iter()
            .find(|prop| prop.entity == entity)
            .map_or("unknown", |prop| prop.name.as_str())
    }
}
