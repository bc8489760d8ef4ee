/// Pointer button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Primary,
    Secondary,
    Middle,
}

impl Button {
    /// Bit of this button in a [`Buttons`] mask
    pub const fn mask(self) -> u8 {
        match self {
            Button::Primary => 1,
            Button::Secondary => 2,
            Button::Middle => 4,
        }
    }
}

/// Set of currently held pointer buttons
///
/// Bit layout follows the DOM `PointerEvent.buttons` convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Buttons(u8);

impl Buttons {
    pub const NONE: Buttons = Buttons(0);
    pub const PRIMARY: Buttons = Buttons(Button::Primary.mask());
    pub const SECONDARY: Buttons = Buttons(Button::Secondary.mask());

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, button: Button) -> bool {
        self.0 & button.mask() != 0
    }

    pub const fn with(self, button: Button) -> Buttons {
        Buttons(self.0 | button.mask())
    }

    pub const fn without(self, button: Button) -> Buttons {
        Buttons(self.0 & !button.mask())
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}
