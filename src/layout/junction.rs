use super::ConnectionFlags;

/// Decides whether coincident connection points render a junction mark.
///
/// Pure function of the flag multiset: a wire terminating into a running
/// line of the other orientation forms a junction, as do three or more
/// terminals that do not all share one orientation. Plain crossings and
/// end-to-end joins of two terminals do not.
pub fn should_draw_junction(flags: &[ConnectionFlags]) -> bool {
    if flags.len() < 2 {
        return false;
    }

    let edges = || flags.iter().filter(|f| f.contains(ConnectionFlags::EDGE));
    let running = || flags.iter().filter(|f| !f.contains(ConnectionFlags::EDGE));

    // A terminal meeting a through-going line of a different orientation.
    for edge in edges() {
        for line in running() {
            if edge.orientation() != line.orientation() {
                return true;
            }
        }
    }

    // A multi-way junction formed by terminals alone.
    let mut edge_orientations = edges().map(|f| f.orientation());
    if edges().count() >= 3 {
        if let Some(first) = edge_orientations.next() {
            if edge_orientations.any(|o| o != first) {
                return true;
            }
        }
    }

    false
}
