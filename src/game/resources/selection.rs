//! Selection resource for tracking the selected square and its highlights

use shakmaty::Square;

/// Currently selected square and the destinations highlighted for it
///
/// In Setup mode `targets` stays empty: any square is a valid drop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub square: Option<Square>,
    pub targets: Vec<Square>,
}

impl Selection {
    pub fn clear(&mut self) {
        self.square = None;
        self.targets.clear();
    }

    pub fn is_selected(&self) -> bool {
        self.square.is_some()
    }

    pub fn select(&mut self, square: Square, targets: Vec<Square>) {
        self.square = Some(square);
        self.targets = targets;
    }

    pub fn is_target(&self, square: Square) -> bool {
        self.targets.contains(&square)
    }
}
