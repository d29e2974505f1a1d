mod common;

#[cfg(test)]
mod tests {
    use std::fs::{self, OpenOptions};
    use std::io::Write;
    use std::sync::Arc;
    use std::thread;

    use salted_core::recovery::{encode_line, state_path, ProcessedSet};

    #[test]
    fn test_reload_after_many_marks() {
        let dir = tempfile::tempdir().unwrap();
        {
            let set = ProcessedSet::load(dir.path()).unwrap();
            for i in 0..100 {
                assert!(set.mark_processed(&format!("d{}/f{i}.bin", i % 7)).unwrap());
            }
        }
        let set = ProcessedSet::load(dir.path()).unwrap();
        assert_eq!(set.len(), 100);
        assert!(set.is_processed("d3/f3.bin"));
    }

    #[test]
    fn test_marking_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let set = ProcessedSet::load(dir.path()).unwrap();
        assert!(set.mark_processed("a").unwrap());
        assert!(!set.mark_processed("a").unwrap());
        drop(set);

        let raw = fs::read_to_string(state_path(dir.path())).unwrap();
        assert_eq!(raw.lines().count(), 1);
    }

    #[test]
    fn test_odd_names_survive() {
        let dir = tempfile::tempdir().unwrap();
        let names = ["with space", "pipe|inside", "new\nline", "ünïcödé/ok"];
        {
            let set = ProcessedSet::load(dir.path()).unwrap();
            for n in names {
                set.mark_processed(n).unwrap();
            }
        }
        let set = ProcessedSet::load(dir.path()).unwrap();
        for n in names {
            assert!(set.is_processed(n), "{n:?}");
        }
    }

    #[test]
    fn test_torn_tail_is_dropped_and_log_stays_usable() {
        let dir = tempfile::tempdir().unwrap();
        {
            let set = ProcessedSet::load(dir.path()).unwrap();
            set.mark_processed("kept").unwrap();
        }
        // simulate a crash half way through an append
        let line = encode_line("torn");
        let mut f = OpenOptions::new().append(true).open(state_path(dir.path())).unwrap();
        f.write_all(&line.as_bytes()[..line.len() / 2]).unwrap();
        drop(f);

        {
            let set = ProcessedSet::load(dir.path()).unwrap();
            assert!(set.is_processed("kept"));
            assert!(!set.is_processed("torn"));
            set.mark_processed("after").unwrap();
        }
        let set = ProcessedSet::load(dir.path()).unwrap();
        assert!(set.is_processed("after"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_concurrent_marks_are_all_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let set = Arc::new(ProcessedSet::load(dir.path()).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let set = Arc::clone(&set);
                thread::spawn(move || {
                    for i in 0..25 {
                        set.mark_processed(&format!("t{t}/{i}")).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        drop(set);

        assert_eq!(ProcessedSet::load(dir.path()).unwrap().len(), 100);
    }
}
