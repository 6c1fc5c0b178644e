use crate::play::Play;

/// Any play with a regular down and a distance may start a transition.
pub fn is_valid_source(play: &Play) -> bool {
    play.regular_down().is_some() && play.dist.is_some()
}

/// Half/game boundary rows and every play with a regular down and a distance
/// (punts and field-goal attempts included) may end a transition.
pub fn is_valid_target(play: &Play) -> bool {
    if play.marks_boundary() {
        return true;
    }
    play.regular_down().is_some() && play.dist.is_some()
}
