//! Static table of well-known ONTAPI error numbers.
//!
//! The remote system only reports a numeric `errno`; this table attaches the
//! symbolic name for the subset of codes that show up in day-to-day operation.
//! Unknown codes are passed through without a name.

const NA_ERRNO: &[(i32, &str)] = &[
    (13001, "EAPIERROR"),
    (13002, "EAPITRANSMISSION"),
    (13003, "EAPIPRIVILEGE"),
    (13005, "EAPINOTFOUND"),
    (13010, "EAPIMISSINGARGUMENT"),
    (13040, "EVOLUMEOFFLINE"),
    (13041, "EVOLUMEDOESNOTEXIST"),
    (13042, "EVOLUMEMOUNTING"),
    (13060, "ESNAPSHOTBUSY"),
    (13062, "ESNAPSHOTEXISTS"),
    (13064, "ESNAPSHOTDOESNOTEXIST"),
    (13102, "EAGGRDOESNOTEXIST"),
    (13108, "EAGGROFFLINE"),
    (13114, "EINVALIDINPUTERROR"),
    (13115, "EINTERNALERROR"),
    (13160, "ESNAPMIRROROFF"),
    (14100, "EQTREEEXISTS"),
    (14102, "EQTREEDOESNOTEXIST"),
    (14920, "EQUOTADOESNOTEXIST"),
    (15661, "EOBJECTNOTFOUND"),
    (17104, "ELUNDOESNOTEXIST"),
    (18605, "EEXPORTDOESNOTEXIST"),
];

/// Looks up the symbolic name for `errno`, if it is one of the known codes.
pub fn error_name(errno: i32) -> Option<&'static str> {
    NA_ERRNO
        .binary_search_by_key(&errno, |(code, _)| *code)
        .ok()
        .map(|idx| NA_ERRNO[idx].1)
}
