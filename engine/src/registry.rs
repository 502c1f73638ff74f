use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TargetId(pub u32);

/// Role of a target. `P` is the position/velocity type of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "camelCase")]
pub enum TargetKind<P> {
    Standard,
    /// Spidershot center target
    Pivot,
    /// The single moving target of tracking mode
    Tracking { velocity: P },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Target<P> {
    pub id: TargetId,
    pub kind: TargetKind<P>,
    pub pos: P,
    pub radius: f64,
    /// Host clock (ms) at spawn
    pub spawned_at: f64,
}

impl<P> Target<P> {
    pub fn age(&self, now: f64) -> f64 {
        now - self.spawned_at
    }

    pub fn is_pivot(&self) -> bool {
        matches!(self.kind, TargetKind::Pivot)
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.kind, TargetKind::Tracking { .. })
    }
}

/// Live targets in spawn order. Ids are never reused, even across `clear()`.
#[derive(Debug)]
pub struct TargetRegistry<P> {
    targets: Vec<Target<P>>,
    next_id: u32,
}

impl<P> Default for TargetRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> TargetRegistry<P> {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            next_id: 1,
        }
    }

    pub fn add(&mut self, kind: TargetKind<P>, pos: P, radius: f64, spawned_at: f64) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.targets.push(Target {
            id,
            kind,
            pos,
            radius,
            spawned_at,
        });
        id
    }

    pub fn remove(&mut self, id: TargetId) -> Option<Target<P>> {
        let idx = self.targets.iter().position(|t| t.id == id)?;
        Some(self.targets.remove(idx))
    }

    pub fn get(&self, id: TargetId) -> Option<&Target<P>> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn all(&self) -> &[Target<P>] {
        &self.targets
    }

    pub fn iter_newest_first(&self) -> impl Iterator<Item = &Target<P>> {
        self.targets.iter().rev()
    }

    pub fn tracking_mut(&mut self) -> Option<&mut Target<P>> {
        self.targets.iter_mut().find(|t| t.is_tracking())
    }

    pub fn tracking(&self) -> Option<&Target<P>> {
        self.targets.iter().find(|t| t.is_tracking())
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
