use crate::select::Rect;

pub const MAX_CHARGE: u32 = 10_000;
pub const CHARGE_PER_FRAME: u32 = 50;
/// Side of the square mutation cursor, in pixels.
pub const CURSOR_SIZE: i32 = 64;

/// Energy gauge gating the manual mutation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Charge {
    level: u32,
    infinite: bool,
}

impl Charge {
    /// Starts full.
    pub fn new(infinite: bool) -> Self {
        Self {
            level: MAX_CHARGE,
            infinite,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_full(&self) -> bool {
        self.level == MAX_CHARGE
    }

    pub fn tick(&mut self) {
        self.level = (self.level + CHARGE_PER_FRAME).min(MAX_CHARGE);
    }

    /// Spends a full gauge. Returns false, leaving the gauge alone, when it
    /// is not full yet.
    pub fn try_spend(&mut self) -> bool {
        if !self.is_full() {
            return false;
        }
        if !self.infinite {
            self.level = 0;
        }
        true
    }
}

/// Cursor footprint with its top-left corner at the pointer.
pub fn cursor_footprint(px: i32, py: i32) -> Rect {
    Rect::new(px, py, CURSOR_SIZE, CURSOR_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spending_drains_and_recharges() {
        let mut charge = Charge::new(false);
        assert!(charge.try_spend());
        assert_eq!(charge.level(), 0);
        assert!(!charge.try_spend());

        for _ in 0..(MAX_CHARGE / CHARGE_PER_FRAME - 1) {
            charge.tick();
        }
        assert!(!charge.is_full());
        charge.tick();
        charge.tick();
        assert_eq!(charge.level(), MAX_CHARGE);
        assert!(charge.try_spend());
    }

    #[test]
    fn infinite_charge_never_drains() {
        let mut charge = Charge::new(true);
        assert!(charge.try_spend());
        assert!(charge.try_spend());
        assert!(charge.is_full());
    }
}
