use crate::config::DecayFactor;
use crate::model::InterestProfile;

/// 全次元の重みに減衰係数を掛けた新しいプロファイルを返す。
///
/// `factor = 1` なら変化なし。小さな値を 0 に丸めることはしない。
#[must_use]
pub fn decay(profile: &InterestProfile, factor: DecayFactor) -> InterestProfile {
    let mut decayed = profile.clone();
    decay_in_place(&mut decayed, factor);
    decayed
}

pub fn decay_in_place(profile: &mut InterestProfile, factor: DecayFactor) {
    profile.scale(factor.get());
}
