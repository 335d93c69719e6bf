//! One-call search entry points, one per digest algorithm

use maskmine_crypto::HashAlgorithm;
use maskmine_pattern::MaskedTarget;

use crate::config::SearchRequest;
use crate::error::SearchError;
use crate::search::{Miner, SearchResult};

/// Validate `request` and run it to completion.
///
/// `Ok(SearchResult::NotFound)` means the whole space was searched without a
/// hit; it is not an error.
pub fn search(algorithm: HashAlgorithm, request: &SearchRequest) -> Result<SearchResult, SearchError> {
    Ok(Miner::new(algorithm, request)?.run()?.result)
}

pub fn search_md5(request: &SearchRequest) -> Result<SearchResult, SearchError> {
    search(HashAlgorithm::Md5, request)
}

pub fn search_sha1(request: &SearchRequest) -> Result<SearchResult, SearchError> {
    search(HashAlgorithm::Sha1, request)
}

pub fn search_sha224(request: &SearchRequest) -> Result<SearchResult, SearchError> {
    search(HashAlgorithm::Sha224, request)
}

pub fn search_sha256(request: &SearchRequest) -> Result<SearchResult, SearchError> {
    search(HashAlgorithm::Sha256, request)
}

pub fn search_sha384(request: &SearchRequest) -> Result<SearchResult, SearchError> {
    search(HashAlgorithm::Sha384, request)
}

pub fn search_sha512(request: &SearchRequest) -> Result<SearchResult, SearchError> {
    search(HashAlgorithm::Sha512, request)
}

/// Check a candidate against a target without searching
pub fn verify(algorithm: HashAlgorithm, candidate: &[u8], target: &MaskedTarget) -> bool {
    target.is_satisfied_by(&algorithm.digest(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ArgumentError, ErrorKind};

    #[test]
    fn test_md5_binary_alphabet() {
        let target = MaskedTarget::exact(HashAlgorithm::Md5.digest(b"00"));
        let request = SearchRequest::new(2, &target)
            .alphabet(b"01".to_vec())
            .parallel(false);

        assert_eq!(search_md5(&request).unwrap(), SearchResult::Found(b"00".to_vec()));
        assert_eq!(
            search_md5(&request.parallel(true)).unwrap(),
            SearchResult::Found(b"00".to_vec())
        );
    }

    #[test]
    fn test_empty_segment_evaluates_prefix_and_suffix_once() {
        let target = MaskedTarget::exact(HashAlgorithm::Sha256.digest(b"hello world"));
        let request = SearchRequest::new(0, &target)
            .prefix(b"hello ".to_vec())
            .suffix(b"world".to_vec());

        let report = Miner::new(HashAlgorithm::Sha256, &request).unwrap().run().unwrap();
        assert_eq!(report.result, SearchResult::Found(b"hello world".to_vec()));
        assert_eq!(report.candidates_tested, 1);

        let miss = SearchRequest::new(0, &target)
            .prefix(b"hello ".to_vec())
            .suffix(b"there".to_vec());
        let report = Miner::new(HashAlgorithm::Sha256, &miss).unwrap().run().unwrap();
        assert_eq!(report.result, SearchResult::NotFound);
        assert_eq!(report.candidates_tested, 1);
    }

    #[test]
    fn test_single_symbol_alphabet() {
        let hit = MaskedTarget::exact(HashAlgorithm::Sha1.digest(b"zzzzz"));
        let request = SearchRequest::new(5, &hit).alphabet(b"z".to_vec());
        assert_eq!(search_sha1(&request).unwrap(), SearchResult::Found(b"zzzzz".to_vec()));

        let miss = MaskedTarget::exact(HashAlgorithm::Sha1.digest(b"zzzz"));
        let request = SearchRequest::new(5, &miss).alphabet(b"z".to_vec());
        assert_eq!(search_sha1(&request).unwrap(), SearchResult::NotFound);
    }

    #[test]
    fn test_exact_match_for_every_algorithm() {
        for algorithm in HashAlgorithm::ALL {
            let target = MaskedTarget::exact(algorithm.digest(b"id-7c"));
            let request = SearchRequest::new(2, &target)
                .prefix(b"id-".to_vec())
                .alphabet(b"0123456789abcdef".to_vec());

            let found = search(algorithm, &request).unwrap();
            assert_eq!(found, SearchResult::Found(b"id-7c".to_vec()), "{algorithm}");
        }
    }

    #[test]
    fn test_partial_mask_matches_are_valid() {
        let target = MaskedTarget::trailing_bits("000000000000", 28).unwrap();
        let request = SearchRequest::new(4, &target).suffix(b"!".to_vec());

        let found = search_sha224(&request).unwrap().into_found().unwrap();
        assert!(found.ends_with(b"!"));
        assert!(verify(HashAlgorithm::Sha224, &found, &target));
    }

    #[test]
    fn test_invalid_arguments_rejected_before_search() {
        let target = MaskedTarget::exact(vec![0u8; 32]);
        let request = SearchRequest::new(8, &target);

        let err = search_sha512(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(matches!(
            err,
            SearchError::InvalidArgument(ArgumentError::MaskLength { expected: 64, actual: 32, .. })
        ));

        let err = search_sha256(&request.clone().alphabet(Vec::new())).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(ArgumentError::EmptyAlphabet)));
    }

    #[test]
    fn test_sha384_not_found_after_exhaustion() {
        let request = SearchRequest::new(2, &MaskedTarget::exact(vec![0u8; 48]))
            .alphabet(b"ab".to_vec());
        assert_eq!(search_sha384(&request).unwrap(), SearchResult::NotFound);
    }

    #[test]
    fn test_verify() {
        let target = MaskedTarget::exact(HashAlgorithm::Md5.digest(b"abc"));
        assert!(verify(HashAlgorithm::Md5, b"abc", &target));
        assert!(!verify(HashAlgorithm::Md5, b"abd", &target));
        assert!(!verify(HashAlgorithm::Sha1, b"abc", &target));
    }

    #[test]
    fn test_long_segment_with_zero_mask() {
        let size = HashAlgorithm::Md5.digest_size();
        let target = MaskedTarget::new(vec![0u8; size], vec![0u8; size]).unwrap();
        let request = SearchRequest::new(200_000, &target)
            .alphabet(b"ab".to_vec())
            .parallel(false);

        assert_eq!(
            search_md5(&request).unwrap(),
            SearchResult::Found(vec![b'a'; 200_000])
        );
    }

    #[test]
    fn test_unallocatable_candidate_is_resource_exhausted() {
        let size = HashAlgorithm::Md5.digest_size();
        let target = MaskedTarget::new(vec![0u8; size], vec![0u8; size]).unwrap();
        let request = SearchRequest::new(usize::MAX / 2, &target);

        let err = search_md5(&request.clone().parallel(false)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceExhausted);

        let err = Miner::new(HashAlgorithm::Md5, &request.threads(2))
            .unwrap()
            .run()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
    }
}
