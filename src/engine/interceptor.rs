use super::{HostWrite, NavigationEngine};
use crate::adapter::AdapterPort;
use crate::history::{HistoryStateRecord, HostHistory};
use crate::identity::{ItemId, OperationId};
use crate::stack::LeaveAnswer;
use futures::future::LocalBoxFuture;
use log::{debug, info, warn};

/// A leave check started on `item` at `generation`, covering a back of
/// `count` pages requested by `op`.
#[derive(Debug, Clone, Copy)]
pub(super) struct LeaveCheck {
    item: ItemId,
    generation: u64,
    count: usize,
    op: Option<OperationId>,
}

#[derive(Debug)]
pub(super) struct LeaveVerdict {
    check: LeaveCheck,
    approved: bool,
}

pub(super) type PendingLeaveCheck = LocalBoxFuture<'static, LeaveVerdict>;

impl<A, H> NavigationEngine<A, H>
where
    A: AdapterPort,
    H: HostHistory,
{
    /// Consults the top page before a host back of `count` pages is applied.
    ///
    /// When the page has a leave-before hook the host is moved back up to
    /// where it was before the hook is evaluated, so a second back cannot
    /// land while the answer is pending. An asynchronous answer is returned
    /// for the event loop to await.
    pub(super) async fn intercept(
        &self,
        landed: HistoryStateRecord,
        count: usize,
        op: Option<OperationId>,
    ) -> Option<PendingLeaveCheck> {
        let started = {
            let mut state = self.state.borrow_mut();
            let top = state.stack.top_mut()?;
            self.adapter
                .leave_before(top)
                .map(|hook| (hook, top.id(), top.next_generation()))
        };
        let Some((hook, item, generation)) = started else {
            self.commit_back(landed, count, op).await;
            return None;
        };
        debug!("Checking whether page {} may leave (generation {})", item, generation);

        self.restore_host(landed, count);
        self.resume_input();

        let check = LeaveCheck {
            item,
            generation,
            count,
            op,
        };
        match hook() {
            LeaveAnswer::Now(approved) => {
                self.settle_leave_check(LeaveVerdict { check, approved });
                None
            }
            LeaveAnswer::Later(answer) => Some(self.await_answer(check, answer)),
        }
    }

    pub(super) fn settle_leave_check(&self, verdict: LeaveVerdict) {
        let LeaveVerdict { check, approved } = verdict;
        let mut state = self.state.borrow_mut();
        let generation = state.stack.get(check.item).map(|item| item.generation());
        if !approved || generation != Some(check.generation) {
            if approved {
                debug!(
                    "Discarding stale leave approval for page {} (generation {}, now {:?})",
                    check.item, check.generation, generation
                );
            } else {
                info!("Page {} refused to leave", check.item);
            }
            if let Some(op) = check.op {
                state.signal.cancel(op);
            }
            return;
        }

        if let Some(op) = check.op {
            state.signal.retag(op);
        }
        state.approved_back = true;
        drop(state);
        debug!("Page {} may leave, going back {} page(s)", check.item, check.count);
        self.suspend_input();
        self.host.go(-(check.count as i64));
    }

    fn await_answer(
        &self,
        check: LeaveCheck,
        answer: LocalBoxFuture<'static, bool>,
    ) -> PendingLeaveCheck {
        let timeout = self.config.leave_check_timeout();
        Box::pin(async move {
            let approved = match timeout {
                Some(limit) => match tokio::time::timeout(limit, answer).await {
                    Ok(approved) => approved,
                    Err(_) => {
                        warn!(
                            "Page {} did not answer its leave check within {:?}, staying",
                            check.item, limit
                        );
                        false
                    }
                },
                None => answer.await,
            };
            LeaveVerdict { check, approved }
        })
    }

    /// Pushes the entries the host just went back over, so the host is at
    /// the pre-back position again.
    fn restore_host(&self, landed: HistoryStateRecord, count: usize) {
        for step in 1..=count as i64 {
            let record = HistoryStateRecord {
                index: landed.index + step,
                session: self.session,
            };
            self.write_host(record, HostWrite::Push);
        }
    }
}
