// Unit helpers for callers working in aviation units. The engine itself is SI.

pub const FT_TO_M: f64 = 0.3048;
pub const KT_TO_MPS: f64 = 1852.0 / 3600.0;
pub const NM_TO_M: f64 = 1852.0;
pub const FPM_TO_MPS: f64 = FT_TO_M / 60.0;

pub fn ft_to_m(feet: f64) -> f64 {
    feet * FT_TO_M
}

pub fn m_to_ft(meters: f64) -> f64 {
    meters / FT_TO_M
}

pub fn kt_to_mps(knots: f64) -> f64 {
    knots * KT_TO_MPS
}

pub fn mps_to_kt(mps: f64) -> f64 {
    mps / KT_TO_MPS
}

pub fn nm_to_m(nautical_miles: f64) -> f64 {
    nautical_miles * NM_TO_M
}

pub fn m_to_nm(meters: f64) -> f64 {
    meters / NM_TO_M
}

pub fn fpm_to_mps(feet_per_minute: f64) -> f64 {
    feet_per_minute * FPM_TO_MPS
}

pub fn mps_to_fpm(mps: f64) -> f64 {
    mps / FPM_TO_MPS
}

pub fn normalize_heading(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}
