//! Field geometry is kept in millimetres; these convert the inch
//! measurements used on the field drawings.

pub const MM_PER_INCH: f32 = 25.4;

pub fn inches(from_inches: f32) -> f32 {
    from_inches * MM_PER_INCH
}
pub fn mm_to_inches(mm: f32) -> f32 {
    mm / MM_PER_INCH
}
