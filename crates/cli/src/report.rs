//! Human readable run summaries.

use alloy_primitives::B256;
use spore_mint::{MintFailure, MintReport};
use spore_networks::NamedNetwork;
use std::fmt::Write;
use std::path::Path;

fn link(network: NamedNetwork, tx_hash: B256) -> String {
    network
        .transaction_url(tx_hash)
        .unwrap_or_else(|| tx_hash.to_string())
}

/// Summary of a successful run with explorer links.
pub fn format_report(report: &MintReport) -> String {
    let mut out = String::new();
    if let Some(spore) = &report.spore {
        let _ = writeln!(out, "spore id:        {}", spore.spore_id);
        let _ = writeln!(out, "root:            {}", link(report.network, spore.tx_hash));
    }
    let _ = writeln!(out, "spore type hash: {}", report.spore_type_hash);
    for segment in &report.segments {
        let _ = writeln!(
            out,
            "segment {:>3}:     {}",
            segment.index,
            link(report.network, segment.tx_hash)
        );
    }
    out
}

fn resume_command(path: &Path, spore_type_hash: B256, next_segment: usize) -> String {
    format!(
        "spore mint {} --resume-type-hash {spore_type_hash} --resume-from {next_segment}",
        path.display()
    )
}

/// What went wrong, how far the run got and how to continue.
///
/// A transaction that was broadcast but not seen committed may still
/// commit, so the advice never suggests minting the root again while one
/// is in flight.
pub fn format_failure(failure: &MintFailure, path: &Path) -> String {
    let progress = &failure.progress;
    let mut out = String::new();
    let _ = writeln!(out, "mint failed: {}", failure.error);
    let _ = writeln!(out, "furthest state: {}", progress.state);
    let _ = writeln!(
        out,
        "segments confirmed: {}/{}",
        progress.next_segment, progress.segment_count
    );

    if let Some(root) = progress.pending_root {
        let _ = writeln!(out, "root transaction {} may still commit", root.tx_hash);
        let _ = writeln!(out, "spore type hash: {}", root.type_hash);
        let _ = writeln!(
            out,
            "once it is committed, resume with: {}",
            resume_command(path, root.type_hash, 0)
        );
        return out;
    }

    match progress.resume_point() {
        Some(point) => {
            let _ = writeln!(out, "spore type hash: {}", point.spore_type_hash);
            match progress.pending_segment {
                Some(segment) => {
                    let _ = writeln!(
                        out,
                        "segment {} transaction {} may still commit",
                        segment.index, segment.tx_hash
                    );
                    let _ = writeln!(
                        out,
                        "once it is committed, resume with: {}",
                        resume_command(path, point.spore_type_hash, segment.index + 1)
                    );
                    let _ = writeln!(
                        out,
                        "if it is rejected, resume with: {}",
                        resume_command(path, point.spore_type_hash, point.next_segment)
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "resume with: {}",
                        resume_command(path, point.spore_type_hash, point.next_segment)
                    );
                }
            }
        }
        None => {
            let _ = writeln!(out, "no spore was committed; run the mint again to retry");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use spore_mint::{
        ConfirmationError, MintError, MintProgress, MintState, SegmentOutcome, SporeOutcome,
        SubmissionError, TxStatus,
    };

    #[test]
    fn test_report_links() {
        let report = MintReport {
            network: NamedNetwork::Testnet,
            spore_type_hash: B256::repeat_byte(2),
            spore: Some(SporeOutcome {
                tx_hash: B256::repeat_byte(1),
                spore_id: B256::repeat_byte(3),
                type_hash: B256::repeat_byte(2),
            }),
            segments: vec![SegmentOutcome {
                index: 0,
                tx_hash: B256::repeat_byte(4),
            }],
        };

        let text = format_report(&report);
        assert!(text.contains(&format!(
            "https://pudge.explorer.nervos.org/transaction/{}",
            B256::repeat_byte(1)
        )));
        assert!(text.contains(&format!("segment   0:     https://pudge.explorer.nervos.org/transaction/{}", B256::repeat_byte(4))));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_failure_prints_resume_flags() {
        let failure = MintFailure {
            error: MintError::Submission(SubmissionError::Signing("device unplugged".into())),
            progress: MintProgress {
                spore_type_hash: Some(B256::repeat_byte(7)),
                next_segment: 2,
                segment_count: 5,
                pending_root: None,
                pending_segment: None,
                state: MintState::SegmentConfirmed { index: 1 },
            },
        };

        let text = format_failure(&failure, Path::new("video.mp4"));
        assert!(text.contains("segments confirmed: 2/5"));
        assert!(text.contains(&format!(
            "resume with: spore mint video.mp4 --resume-type-hash {} --resume-from 2",
            B256::repeat_byte(7)
        )));
    }

    #[test]
    fn test_failure_before_root() {
        let failure = MintFailure {
            error: MintError::Confirmation(ConfirmationError::Rejected {
                tx_hash: B256::ZERO,
                status: TxStatus::Rejected("out of capacity".into()),
            }),
            progress: MintProgress {
                spore_type_hash: None,
                next_segment: 0,
                segment_count: 3,
                pending_root: None,
                pending_segment: None,
                state: MintState::RootSubmitted { tx_hash: B256::ZERO },
            },
        };

        let text = format_failure(&failure, Path::new("video.mp4"));
        assert!(text.contains("out of capacity"));
        assert!(!text.contains("--resume-from"));
    }

    fn timed_out(tx_hash: B256) -> MintError {
        MintError::Confirmation(ConfirmationError::Timeout {
            tx_hash,
            last_status: Some(TxStatus::Pending),
        })
    }

    #[test]
    fn test_pending_root_is_not_minted_again() {
        let root = SporeOutcome {
            tx_hash: B256::repeat_byte(1),
            spore_id: B256::repeat_byte(3),
            type_hash: B256::repeat_byte(2),
        };
        let failure = MintFailure {
            error: timed_out(root.tx_hash),
            progress: MintProgress {
                spore_type_hash: None,
                next_segment: 0,
                segment_count: 3,
                pending_root: Some(root),
                pending_segment: None,
                state: MintState::RootSubmitted {
                    tx_hash: root.tx_hash,
                },
            },
        };

        let text = format_failure(&failure, Path::new("video.mp4"));
        assert!(text.contains(&format!("root transaction {} may still commit", root.tx_hash)));
        assert!(text.contains(&format!(
            "once it is committed, resume with: spore mint video.mp4 --resume-type-hash {} --resume-from 0",
            root.type_hash
        )));
        assert!(!text.contains("run the mint again"));
    }

    #[test]
    fn test_pending_segment_offers_both_resume_points() {
        let segment = SegmentOutcome {
            index: 1,
            tx_hash: B256::repeat_byte(4),
        };
        let failure = MintFailure {
            error: timed_out(segment.tx_hash),
            progress: MintProgress {
                spore_type_hash: Some(B256::repeat_byte(7)),
                next_segment: 1,
                segment_count: 3,
                pending_root: None,
                pending_segment: Some(segment),
                state: MintState::SegmentSubmitted {
                    index: 1,
                    tx_hash: segment.tx_hash,
                },
            },
        };

        let text = format_failure(&failure, Path::new("video.mp4"));
        let hash = B256::repeat_byte(7);
        assert!(text.contains(&format!("segment 1 transaction {} may still commit", segment.tx_hash)));
        assert!(text.contains(&format!(
            "once it is committed, resume with: spore mint video.mp4 --resume-type-hash {hash} --resume-from 2"
        )));
        assert!(text.contains(&format!(
            "if it is rejected, resume with: spore mint video.mp4 --resume-type-hash {hash} --resume-from 1"
        )));
    }
}
