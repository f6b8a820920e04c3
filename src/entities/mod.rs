pub mod material;
pub mod material_length_adjustment;
pub mod material_order;
pub mod ticket;
pub mod vendor;
