use queue_core::{Candidate, CandidateSource, FrameReply, QueryDecision, QuerySet};

#[test]
fn earliest_frame_with_link_wins_regardless_of_arrival_order() {
    let mut set = QuerySet::new([0, 3, 7]);

    // Frame 7 answers first, but frames 0 and 3 have not settled yet.
    assert!(set.record(7, FrameReply::Answered("https://c".into())));
    assert_eq!(set.decision(), QueryDecision::Pending);

    assert!(set.record(3, FrameReply::Answered("https://b".into())));
    assert_eq!(set.decision(), QueryDecision::Pending);

    assert!(set.record(0, FrameReply::Answered(String::new())));
    assert_eq!(
        set.decision(),
        QueryDecision::Found {
            frame_id: 3,
            href: "https://b".into()
        }
    );
}

#[test]
fn first_frame_with_link_short_circuits_later_frames() {
    let mut set = QuerySet::new([0, 1, 2]);
    set.record(0, FrameReply::Answered("https://top".into()));

    assert_eq!(
        set.decision(),
        QueryDecision::Found {
            frame_id: 0,
            href: "https://top".into()
        }
    );
}

#[test]
fn timeouts_and_unreachable_frames_do_not_block() {
    let mut set = QuerySet::new([0, 1, 2]);
    set.record(0, FrameReply::TimedOut);
    set.record(1, FrameReply::Unreachable);
    assert_eq!(set.decision(), QueryDecision::Pending);

    set.record(2, FrameReply::Answered("https://embed".into()));
    assert_eq!(
        set.candidate("https://tab"),
        Some(Candidate::new("https://embed", CandidateSource::Link))
    );
}

#[test]
fn exhausted_set_falls_back_to_tab_url_or_nothing() {
    let mut set = QuerySet::new([0, 1]);
    set.record(0, FrameReply::TimedOut);
    set.record(1, FrameReply::Answered(String::new()));

    assert_eq!(set.decision(), QueryDecision::Exhausted);
    assert_eq!(
        set.candidate("https://www.youtube.com/watch?v=1"),
        Some(Candidate::new(
            "https://www.youtube.com/watch?v=1",
            CandidateSource::ActiveTabUrl
        ))
    );
    assert_eq!(set.candidate(""), None);
}

#[test]
fn late_or_duplicate_replies_are_ignored() {
    let mut set = QuerySet::new([0, 0, 1]);
    assert_eq!(set.len(), 2);

    assert!(set.record(0, FrameReply::TimedOut));
    assert!(!set.record(0, FrameReply::Answered("https://late".into())));
    assert!(!set.record(42, FrameReply::Answered("https://unknown".into())));

    set.record(1, FrameReply::TimedOut);
    assert_eq!(set.decision(), QueryDecision::Exhausted);
}

#[test]
fn empty_frame_list_is_immediately_exhausted() {
    let set = QuerySet::new(Vec::new());
    assert!(set.is_empty());
    assert_eq!(set.decision(), QueryDecision::Exhausted);
}
