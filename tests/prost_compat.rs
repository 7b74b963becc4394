//! Cross-checks the genesis encoding against prost.

use genesis_codec::codec::{Duration, ProtoMessage};
use genesis_codec::genesis::{GenesisState, Params};
use prost::Message as _;
use proptest::prelude::*;

mod prost_types {
    #[derive(Clone, Copy, PartialEq, prost::Message)]
    pub struct Duration {
        #[prost(sint64, tag = "1")]
        pub seconds: i64,
        #[prost(sint32, tag = "2")]
        pub nanos: i32,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Params {
        #[prost(bool, tag = "1")]
        pub enable_recovery: bool,
        #[prost(message, optional, tag = "2")]
        pub packet_timeout_duration: Option<Duration>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct GenesisState {
        #[prost(message, optional, tag = "1")]
        pub params: Option<Params>,
    }

    /// A later revision of `Params` with fields the local schema does not know.
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct ParamsV3 {
        #[prost(bool, tag = "1")]
        pub enable_recovery: bool,
        #[prost(message, optional, tag = "2")]
        pub packet_timeout_duration: Option<Duration>,
        #[prost(string, tag = "3")]
        pub channel: String,
        #[prost(fixed64, tag = "4")]
        pub max_packets: u64,
        #[prost(fixed32, tag = "5")]
        pub version: u32,
        #[prost(uint64, repeated, tag = "6")]
        pub heights: Vec<u64>,
    }
}

fn to_prost(state: &GenesisState) -> prost_types::GenesisState {
    let params = &state.params;
    prost_types::GenesisState {
        params: Some(prost_types::Params {
            enable_recovery: params.enable_recovery,
            packet_timeout_duration: params.packet_timeout_duration.map(|d| {
                prost_types::Duration {
                    seconds: d.seconds,
                    nanos: d.nanos,
                }
            }),
        }),
    }
}

#[test]
fn test_concrete_state_matches_prost() {
    let state = GenesisState::new(Params::new(true, Duration::from_secs(86_400)));
    let ours = state.encode().unwrap();
    let theirs = to_prost(&state).encode_to_vec();
    assert_eq!(&ours[..], &theirs[..]);

    let decoded = prost_types::GenesisState::decode(&ours[..]).unwrap();
    assert_eq!(decoded, to_prost(&state));
}

#[test]
fn test_newer_schema_fields_are_skipped() {
    let newer = prost_types::ParamsV3 {
        enable_recovery: true,
        packet_timeout_duration: Some(prost_types::Duration {
            seconds: -30,
            nanos: -500,
        }),
        channel: "channel-0".to_string(),
        max_packets: u64::MAX,
        version: 3,
        heights: vec![1, 300, 70_000],
    };
    let bytes = newer.encode_to_vec();

    let params = Params::decode(&bytes).expect("decode failed");
    assert_eq!(params, Params::new(true, Duration::new(-30, -500).unwrap()));
}

proptest! {
    #[test]
    fn proptest_matches_prost(
        enable_recovery in any::<bool>(),
        duration in proptest::option::of((-Duration::MAX_SECONDS..=Duration::MAX_SECONDS, 0..Duration::NANOS_PER_SECOND)),
    ) {
        let packet_timeout_duration = duration.map(|(seconds, nanos)| Duration {
            seconds,
            nanos: if seconds < 0 { -nanos } else { nanos },
        });
        let state = GenesisState::new(Params { enable_recovery, packet_timeout_duration });

        let ours = state.encode().unwrap();
        let theirs = to_prost(&state).encode_to_vec();
        prop_assert_eq!(&ours[..], &theirs[..]);
        prop_assert_eq!(GenesisState::decode(&theirs).unwrap(), state);
    }
}
