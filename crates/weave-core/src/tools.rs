//! Toolbar "add" actions: place new objects on the current layer.

use crate::config::WeaveConfig;
use crate::geometry::ShapeKind;
use crate::object::{ObjectId, ObjectType, WorldObject};
use crate::store::ObjectStore;
use crate::style::{ObjectStyle, TRANSPARENT, TextAlign};
use glam::DVec3;

const STICKY_FILL: &str = "#fef3c7";
const STICKY_STROKE: &str = "#d97706";
const STICKY_STROKE_WIDTH: f64 = 1.0;
const TEXT_PLACEHOLDER: &str = "Text";
const CARD_SCALE: DVec3 = DVec3::new(1.0, 1.4, 1.0);
const CLOCK_POSITION: DVec3 = DVec3::new(0.0, 0.0, 0.5);

/// Creates objects with the board's placement rules.
#[derive(Debug, Clone)]
pub struct ObjectFactory {
    shape_spacing: f64,
    shape_wrap: f64,
    sticky_step: f64,
    sticky_attempts: usize,
    sticky_tolerance: f64,
}

impl ObjectFactory {
    pub fn new(config: &WeaveConfig) -> Self {
        Self {
            shape_spacing: config.shape_spacing,
            shape_wrap: config.shape_wrap,
            sticky_step: config.sticky_cascade_step,
            sticky_attempts: config.sticky_max_attempts,
            sticky_tolerance: config.sticky_occupancy_tolerance,
        }
    }

    /// Next free slot on the shape diagonal, wrapping back to the origin.
    fn shape_slot(&self, store: &ObjectStore) -> DVec3 {
        let offset = (store.len() as f64 * self.shape_spacing) % self.shape_wrap;
        DVec3::new(offset, -offset, 0.0)
    }

    fn place(&self, store: &mut ObjectStore, object: WorldObject) -> ObjectId {
        let object = object.with_layer(store.current_layer());
        let id = object.id;
        log::debug!("Adding {:?} {} at {}", object.object_type, id, object.position);
        store.add(object);
        id
    }

    pub fn add_shape(&self, store: &mut ObjectStore, kind: ShapeKind) -> ObjectId {
        let position = self.shape_slot(store);
        let object = WorldObject::new(ObjectType::Shape, position).with_style(ObjectStyle::shape(kind));
        self.place(store, object)
    }

    pub fn add_text(&self, store: &mut ObjectStore) -> ObjectId {
        let position = self.shape_slot(store);
        let style = ObjectStyle {
            fill_color: Some(TRANSPARENT.to_string()),
            text_align: Some(TextAlign::Center),
            ..ObjectStyle::default()
        };
        let object = WorldObject::new(ObjectType::Text, position)
            .with_style(style)
            .with_content(TEXT_PLACEHOLDER);
        self.place(store, object)
    }

    /// Add an empty sticky note, select it and open its editor.
    ///
    /// Starts at the origin and steps down-right while the spot is taken on the
    /// current layer.
    pub fn add_sticky(&self, store: &mut ObjectStore) -> ObjectId {
        let layer = store.current_layer();
        let mut position = DVec3::ZERO;
        for _ in 0..self.sticky_attempts {
            let occupied = store.objects().any(|o| {
                o.layer() == layer
                    && (o.position.x - position.x).abs() < self.sticky_tolerance
                    && (o.position.y - position.y).abs() < self.sticky_tolerance
            });
            if !occupied {
                break;
            }
            position.x += self.sticky_step;
            position.y -= self.sticky_step;
        }

        let style = ObjectStyle {
            fill_color: Some(STICKY_FILL.to_string()),
            stroke_color: Some(STICKY_STROKE.to_string()),
            stroke_width: Some(STICKY_STROKE_WIDTH),
            ..ObjectStyle::default()
        };
        let object = WorldObject::new(ObjectType::Sticky, position)
            .with_style(style)
            .with_content("");
        let id = self.place(store, object);
        store.set_selection([id]);
        store.set_editing(Some(id));
        id
    }

    /// Add a flip card with the given face image URLs.
    pub fn add_card(&self, store: &mut ObjectStore, front: &str, back: &str) -> ObjectId {
        let style = ObjectStyle {
            front_image: Some(front.to_string()),
            back_image: Some(back.to_string()),
            ..ObjectStyle::default()
        };
        let object = WorldObject::new(ObjectType::Card, DVec3::ZERO)
            .with_scale(CARD_SCALE)
            .with_style(style);
        self.place(store, object)
    }

    pub fn add_clock(&self, store: &mut ObjectStore) -> ObjectId {
        self.place(store, WorldObject::new(ObjectType::Clock, CLOCK_POSITION))
    }
}
