pub mod atmosphere;
pub mod geodesy;
pub mod kinematics;
pub mod navigation;
