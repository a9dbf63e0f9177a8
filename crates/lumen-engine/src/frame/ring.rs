use anyhow::{Result, bail};

/// Per-slot "available" signal.
///
/// `wait` blocks until the work last submitted on the slot has finished. A
/// slot with nothing in flight is available immediately.
pub trait SlotFence {
    fn wait(&mut self) -> Result<()>;
}

/// Fixed ring of workspace slots used round-robin.
///
/// Frame `i` uses slot `i mod W`, and `acquire` does not hand a slot out
/// again until the fence recorded for it `W` frames earlier has fired.
#[derive(Debug)]
pub struct WorkspaceRing<F> {
    fences: Vec<F>,
    next: usize,
    frame: u64,
}

impl<F: SlotFence> WorkspaceRing<F> {
    pub fn new(fences: Vec<F>) -> Result<Self> {
        if fences.is_empty() {
            bail!("workspace ring needs at least one slot");
        }
        Ok(Self { fences, next: 0, frame: 0 })
    }

    pub fn len(&self) -> usize {
        self.fences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fences.is_empty()
    }

    /// Number of slots handed out so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Blocks until the next slot is free and returns its index.
    pub fn acquire(&mut self) -> Result<usize> {
        let slot = self.next;
        self.fences[slot].wait()?;

        self.next = (slot + 1) % self.fences.len();
        self.frame += 1;
        Ok(slot)
    }

    pub fn fence_mut(&mut self, slot: usize) -> &mut F {
        &mut self.fences[slot]
    }

    /// Waits on every slot, e.g. before tearing resources down.
    pub fn wait_all(&mut self) -> Result<()> {
        for fence in &mut self.fences {
            fence.wait()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Submit { slot: usize, frame: u64 },
        Wait { slot: usize, pending: Option<u64> },
    }

    struct MockFence {
        slot: usize,
        pending: Option<u64>,
        log: Rc<RefCell<Vec<Event>>>,
    }

    impl MockFence {
        fn submit(&mut self, frame: u64) {
            self.pending = Some(frame);
            self.log.borrow_mut().push(Event::Submit { slot: self.slot, frame });
        }
    }

    impl SlotFence for MockFence {
        fn wait(&mut self) -> Result<()> {
            let pending = self.pending.take();
            self.log.borrow_mut().push(Event::Wait { slot: self.slot, pending });
            Ok(())
        }
    }

    fn ring(w: usize) -> (WorkspaceRing<MockFence>, Rc<RefCell<Vec<Event>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let fences = (0..w)
            .map(|slot| MockFence { slot, pending: None, log: Rc::clone(&log) })
            .collect();
        (WorkspaceRing::new(fences).unwrap(), log)
    }

    // ── round robin ───────────────────────────────────────────────────────

    #[test]
    fn slot_for_frame_i_is_i_mod_w() {
        for w in 1..=4 {
            let (mut r, _) = ring(w);
            for i in 0..13u64 {
                let slot = r.acquire().unwrap();
                assert_eq!(slot as u64, i % w as u64);
                r.fence_mut(slot).submit(i);
            }
            assert_eq!(r.frame(), 13);
        }
    }

    #[test]
    fn reuse_waits_for_submission_w_frames_back() {
        let w = 3;
        let (mut r, log) = ring(w);
        for i in 0..10u64 {
            let slot = r.acquire().unwrap();
            r.fence_mut(slot).submit(i);
        }

        let waits: Vec<_> = log
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Wait { slot, pending } => Some((*slot, *pending)),
                _ => None,
            })
            .collect();

        for (i, (slot, pending)) in waits.iter().enumerate() {
            assert_eq!(*slot, i % w);
            let expected = (i >= w).then(|| (i - w) as u64);
            assert_eq!(*pending, expected);
        }
    }

    #[test]
    fn wait_precedes_submit_on_same_slot() {
        let (mut r, log) = ring(2);
        for i in 0..4u64 {
            let slot = r.acquire().unwrap();
            r.fence_mut(slot).submit(i);
        }
        let log = log.borrow();
        for (pos, e) in log.iter().enumerate() {
            if let Event::Submit { slot, .. } = e {
                assert!(matches!(log[pos - 1], Event::Wait { slot: s, .. } if s == *slot));
            }
        }
    }

    // ── edges ─────────────────────────────────────────────────────────────

    #[test]
    fn empty_ring_is_rejected() {
        let fences: Vec<MockFence> = Vec::new();
        assert!(WorkspaceRing::new(fences).is_err());
    }

    #[test]
    fn wait_all_drains_every_slot() {
        let (mut r, log) = ring(2);
        for i in 0..2u64 {
            let slot = r.acquire().unwrap();
            r.fence_mut(slot).submit(i);
        }
        r.wait_all().unwrap();
        let tail: Vec<_> = log.borrow()[log.borrow().len() - 2..].to_vec();
        assert_eq!(
            tail,
            vec![
                Event::Wait { slot: 0, pending: Some(0) },
                Event::Wait { slot: 1, pending: Some(1) },
            ]
        );
    }
}
