use crate::types::{Fips, Overlay};

/// Coarse view of the hover/selection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionPhase {
    Idle,
    Hovering(Fips),
    Selected(Fips),
    SelectedAndHovering { selected: Fips, hovered: Fips },
}

/// Hover-emphasis calls a transition requires, applied in order:
/// clear the previous target first, then set the new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoverChange {
    pub clear: Option<Fips>,
    pub set: Option<Fips>,
}

impl HoverChange {
    pub fn is_noop(&self) -> bool { self.clear.is_none() && self.set.is_none() }
}

/// The only mutable state of a map session.
///
/// At most one county carries hover emphasis. The selection is sticky: it stays
/// until cleared or replaced by another click, and it takes precedence over the
/// hovered county when resolving what to display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionState {
    hovered: Option<Fips>,
    selected: Option<Fips>,
    overlay: Overlay,
}

impl InteractionState {
    pub fn new(overlay: Overlay) -> Self { Self { hovered: None, selected: None, overlay } }

    #[inline]
    pub fn hovered(&self) -> Option<&Fips> { self.hovered.as_ref() }

    #[inline]
    pub fn selected(&self) -> Option<&Fips> { self.selected.as_ref() }

    #[inline]
    pub fn overlay(&self) -> Overlay { self.overlay }

    /// County whose details should be displayed: the selection, else the hover.
    pub fn display(&self) -> Option<&Fips> { self.selected.as_ref().or(self.hovered.as_ref()) }

    pub fn phase(&self) -> InteractionPhase {
        match (&self.selected, &self.hovered) {
            (None, None) => InteractionPhase::Idle,
            (None, Some(h)) => InteractionPhase::Hovering(h.clone()),
            (Some(s), None) => InteractionPhase::Selected(s.clone()),
            (Some(s), Some(h)) => InteractionPhase::SelectedAndHovering {
                selected: s.clone(),
                hovered: h.clone(),
            },
        }
    }

    /// Pointer moved over a county. Re-hovering the current target changes nothing.
    pub fn hover(&mut self, fips: Fips) -> HoverChange {
        if self.hovered.as_ref() == Some(&fips) { return HoverChange::default() }
        let clear = self.hovered.replace(fips.clone());
        HoverChange { clear, set: Some(fips) }
    }

    /// Pointer left every county.
    pub fn leave(&mut self) -> HoverChange {
        HoverChange { clear: self.hovered.take(), set: None }
    }

    /// Click on a county replaces any previous selection. Hover is untouched.
    /// Returns whether the selection changed.
    pub fn click(&mut self, fips: Fips) -> bool {
        if self.selected.as_ref() == Some(&fips) { return false }
        self.selected = Some(fips);
        true
    }

    /// Drop the selection; display falls back to the hovered county, if any.
    /// Returns whether anything was selected.
    pub fn clear_selection(&mut self) -> bool { self.selected.take().is_some() }

    /// Switch overlay. Orthogonal to hover and selection.
    /// Returns whether the overlay changed.
    pub fn set_overlay(&mut self, overlay: Overlay) -> bool {
        if self.overlay == overlay { return false }
        self.overlay = overlay;
        true
    }
}
