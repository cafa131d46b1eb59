/// Keeping exactly one live button on pages that rewrite their own DOM

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// The button is in the document
    Present,
    /// Missing, but a drag holds the element; retry on release
    Deferred,
    /// Missing and idle; create it again
    Recreate,
}

/// The "already created" half of the duplicate guard; the other half is the
/// DOM lookup the caller performs before each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lifecycle {
    created: bool,
}

impl Lifecycle {
    #[cfg(test)]
    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Claim creation. False if a button exists or creation already happened.
    pub fn try_begin_create(&mut self, present_in_dom: bool) -> bool {
        if self.created || present_in_dom {
            return false;
        }
        self.created = true;
        true
    }

    /// Undo a claim whose DOM insertion failed
    pub fn abort_create(&mut self) {
        self.created = false;
    }

    /// React to a DOM mutation batch
    pub fn reconcile(&mut self, present_in_dom: bool, drag_active: bool) -> Reconcile {
        if present_in_dom {
            return Reconcile::Present;
        }
        if drag_active {
            return Reconcile::Deferred;
        }
        self.created = false;
        Reconcile::Recreate
    }
}
