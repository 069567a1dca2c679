use super::{BackOutcome, NavigationEngine};
use crate::adapter::AdapterPort;
use crate::history::{HistoryStateRecord, HostHistory};
use crate::identity::OperationId;
use log::{debug, info};

impl<A, H> NavigationEngine<A, H>
where
    A: AdapterPort,
    H: HostHistory,
{
    /// Makes the next host back notification remove pages from beneath the
    /// visible one instead of consulting it.
    pub fn start_black_back(&self) {
        debug!("Next back is a black-box back");
        self.state.borrow_mut().black_box_armed = true;
    }

    /// Silently drops the `n` pages beneath the visible one. `[a, b, c, d]`
    /// with `n = 2` becomes `[a, d]` without any transition or hook.
    pub async fn black_box_back(&self, n: usize) -> BackOutcome {
        if self.back_count(n) == 0 {
            return BackOutcome::Ignored;
        }
        self.start_black_back();
        self.go_back(n).await
    }

    pub(super) async fn remove_black_box(
        &self,
        landed: HistoryStateRecord,
        count: usize,
        op: Option<OperationId>,
    ) {
        let removed = {
            let mut state = self.state.borrow_mut();
            let removed = state.stack.remove_below_top(count);
            state.current = Self::landed_record(&state.stack, landed);
            removed
        };
        info!("Black-box back removed {} page(s), {} remain", removed.len(), self.len());
        for item in removed {
            self.adapter.unmount(item, false).await;
        }
        self.state.borrow_mut().signal.apply_back_hook(op);
        self.resume_input();
    }
}
