//! Duel hand assignment
//!
//! Hands carry no identity across frames. Each frame every fingertip is
//! classified by which half of the play field it lands in.

use glam::Vec2;

/// Split fingertips between the two players by screen half.
///
/// Left of `midline` feeds player one, the rest feed player two. A point on
/// an eliminated player's side is dropped. When several points land on one
/// side the last one wins.
pub fn assign_hands(points: &[Vec2], midline: f32, alive: [bool; 2]) -> [Option<Vec2>; 2] {
    let mut assigned = [None, None];
    for &p in points {
        let side = if p.x < midline { 0 } else { 1 };
        if alive[side] {
            assigned[side] = Some(p);
        } else {
            log::trace!("Dropping hand at {:?}: player {} is out", p, side + 1);
        }
    }
    assigned
}
