/// Hitobject related types.
pub mod hit_object;

/// Coordinates on the playfield.
pub mod pos;
