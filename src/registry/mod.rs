// Room Registry
//
// Resolves configured operating rooms to their weights and folds zero-weight
// rooms (secondary bays) into a weighted sibling. The merge map is computed
// once when the registry is built; lookups never search.
//
// Configuration rows are read in order and stop at the first row without a
// usable weight, so trailing notes or totals in the source table are ignored.

mod definition;
mod rooms;

pub use definition::{read_label_list, read_weight_rows, RoomRow, WeightCell};
pub use rooms::{room_prefix, RoomRegistry};
