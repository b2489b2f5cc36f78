//! Ground-surface energy balance pieces: wind convection and the net
//! radiation / evapotranspiration heat gain.
//!
//! The evapotranspiration model is the FAO-56 hourly reference formulation:
//! absorbed short-wave minus clear-sky-ratio long-wave emission gives net
//! radiation, a soil heat flux split day/night, and the Penman-Monteith
//! combination equation gives the latent heat carried off by evaporating
//! soil moisture.

use gl_core::units::constants::{AIR_DENSITY, AIR_SPECIFIC_HEAT};
use gl_core::Real;
use std::f64::consts::PI;

// Solar constant expressed in MJ/m2-min, as used by the FAO-56 forms.
const MEAN_SOLAR_CONSTANT: Real = 0.08196;
// Short-wave absorptivity of moist bare soil.
const ABSORPTIVITY_CORRECTED: Real = 0.77;
const CONVERT_WM2_TO_MJHRMIN: Real = 3600.0 / 1.0e6;
const RHO_WATER: Real = 998.0;
// Standard-ish station pressure, kPa. The reference model fixes this.
const ATMOSPHERIC_PRESSURE_KPA: Real = 98.0;
// FAO-56 hourly numerator wind constant.
const CN: Real = 37.0;

/// Weather sampled for the current time step.
#[derive(Clone, Copy, Debug)]
pub struct Weather {
    /// Outdoor dry-bulb, deg C.
    pub air_temp: Real,
    /// Relative humidity as a fraction in [0, 1].
    pub relative_humidity: Real,
    /// Wind speed, m/s.
    pub wind_speed: Real,
    /// Incident beam solar on the horizontal, W/m2.
    pub beam_solar: Real,
}

/// Site constants for solar geometry.
#[derive(Clone, Copy, Debug)]
pub struct SitePosition {
    pub latitude_deg: Real,
    pub longitude_deg: Real,
    /// Standard meridian of the local time zone, degrees.
    pub time_zone_meridian_deg: Real,
}

/// Wall-clock position within the year, for solar geometry.
#[derive(Clone, Copy, Debug)]
pub struct SolarTime {
    pub day_of_year: u32,
    /// Local clock time, hours in [0, 24).
    pub hour: Real,
}

/// Convective resistance between a ground-surface cell face and outdoor air,
/// K/W. `None` in calm conditions (wind at or below 0.1 m/s), where the
/// convective exchange is dropped entirely.
pub fn surface_convection_resistance(wind_speed: Real, area: Real) -> Option<Real> {
    if wind_speed > 0.1 {
        Some(208.0 / (AIR_DENSITY * AIR_SPECIFIC_HEAT * wind_speed * area))
    } else {
        None
    }
}

/// Net heat gain at the ground surface, W/m2: absorbed solar minus net
/// long-wave emission minus evapotranspiration latent heat.
///
/// `ground_cover_coefficient` scales the moisture loss (0 = bare sealed
/// surface, 1 = reference grass, up to 1.5 for dense vegetation).
/// `prev_surface_temp` is the surface cell's previous-time-step temperature,
/// used for the latent heat of vaporization.
pub fn net_surface_flux(
    weather: &Weather,
    site: &SitePosition,
    time: &SolarTime,
    ground_cover_coefficient: Real,
    prev_surface_temp: Real,
) -> Real {
    let air = weather.air_temp;
    let incident = weather.beam_solar * CONVERT_WM2_TO_MJHRMIN;
    let absorbed = ABSORPTIVITY_CORRECTED * incident;

    let ratio_so = clear_sky_ratio(incident, site, time);

    let vp_saturated = saturated_vapor_pressure_kpa(air);
    let vp_actual = vp_saturated * weather.relative_humidity;

    // Net long-wave emission from the surface, MJ/m2-hr.
    let cloud_factor = 1.35 * ratio_so - 0.35;
    let emissivity_factor = 0.34 - 0.14 * vp_actual.sqrt();
    let long_wave = 2.042e-10 * cloud_factor * emissivity_factor * (air + 273.15).powi(4);

    let net_radiation = absorbed - long_wave;

    // Soil heat flux and surface resistance constant split day/night.
    let (soil_flux, cd) = if net_radiation > 0.0 {
        (0.1 * net_radiation, 0.24)
    } else {
        (0.5 * net_radiation, 0.96)
    };

    let slope = 2503.0 * (17.27 * air / (air + 237.3)).exp() / (air + 237.3).powi(2);
    let psychrometric = 0.665e-3 * ATMOSPHERIC_PRESSURE_KPA;
    let wind = weather.wind_speed;

    let evapotrans_mm_hr = (0.408 * slope * (net_radiation - soil_flux)
        + psychrometric * (CN / (air + 273.0)) * wind * (vp_saturated - vp_actual))
        / (slope + psychrometric * (1.0 + cd * wind));
    let fluid_loss_m_hr = ground_cover_coefficient * evapotrans_mm_hr / 1000.0;

    let latent_heat_mj_kg = 2.501 - 2.361e-3 * prev_surface_temp;
    let evapotrans_heat = RHO_WATER * fluid_loss_m_hr * latent_heat_mj_kg;

    (net_radiation - evapotrans_heat) / CONVERT_WM2_TO_MJHRMIN
}

fn saturated_vapor_pressure_kpa(temp: Real) -> Real {
    0.6108 * (17.27 * temp / (temp + 237.3)).exp()
}

/// Ratio of measured to extraterrestrial solar over the current hour,
/// clamped to [0.3, 1.0]; proxies sky clearness in the long-wave term.
fn clear_sky_ratio(incident_mjhr: Real, site: &SitePosition, time: &SolarTime) -> Real {
    let day = time.day_of_year as Real;
    let latitude = site.latitude_deg.to_radians();

    let dr = 1.0 + 0.033 * (2.0 * PI * day / 365.0).cos();
    let declination = 0.409 * (2.0 * PI / 365.0 * day - 1.39).sin();

    // Seasonal clock correction and solar hour angle at mid-interval.
    let b = 2.0 * PI * (day - 81.0) / 364.0;
    let correction = 0.1645 * (2.0 * b).sin() - 0.1255 * b.cos() - 0.025 * b.sin();
    let solar_hour =
        time.hour + 0.06667 * (site.time_zone_meridian_deg - site.longitude_deg) + correction;
    let hour_angle = PI / 12.0 * (solar_hour - 12.0);

    let mut x = 1.0 - latitude.tan().powi(2) * declination.tan().powi(2);
    if x <= 0.0 {
        x = 1.0e-5;
    }
    let sunset_angle = PI / 2.0 - (-latitude.tan() * declination.tan() / x.sqrt()).atan();

    // Integration bounds: half an hour either side, clipped to daylight.
    let mut angle_start = (hour_angle - PI / 24.0).clamp(-sunset_angle, sunset_angle);
    let angle_end = (hour_angle + PI / 24.0).clamp(-sunset_angle, sunset_angle);
    if angle_start > angle_end {
        angle_start = angle_end;
    }

    let extraterrestrial = 12.0 * 60.0 / PI
        * MEAN_SOLAR_CONSTANT
        * dr
        * ((angle_end - angle_start) * latitude.sin() * declination.sin()
            + latitude.cos() * declination.cos() * (angle_end.sin() - angle_start.sin()));

    if extraterrestrial > 1.0e-12 {
        (incident_mjhr / extraterrestrial).clamp(0.3, 1.0)
    } else {
        0.3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SitePosition {
        SitePosition {
            latitude_deg: 40.0,
            longitude_deg: -105.0,
            time_zone_meridian_deg: -105.0,
        }
    }

    fn summer_noon() -> SolarTime {
        SolarTime {
            day_of_year: 172,
            hour: 12.0,
        }
    }

    #[test]
    fn calm_wind_drops_convection() {
        assert!(surface_convection_resistance(0.05, 1.0).is_none());
        assert!(surface_convection_resistance(0.1, 1.0).is_none());
        let r = surface_convection_resistance(3.0, 2.0).unwrap();
        assert!(r > 0.0);
        // Doubling the wind halves the resistance.
        let r2 = surface_convection_resistance(6.0, 2.0).unwrap();
        assert!((r / r2 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn sunny_day_yields_net_gain() {
        let weather = Weather {
            air_temp: 25.0,
            relative_humidity: 0.4,
            wind_speed: 2.0,
            beam_solar: 800.0,
        };
        let flux = net_surface_flux(&weather, &site(), &summer_noon(), 0.5, 20.0);
        assert!(flux > 0.0);
        // Never more than the absorbed short-wave.
        assert!(flux < ABSORPTIVITY_CORRECTED * 800.0);
    }

    #[test]
    fn clear_night_yields_net_loss() {
        let weather = Weather {
            air_temp: 5.0,
            relative_humidity: 0.5,
            wind_speed: 1.0,
            beam_solar: 0.0,
        };
        let time = SolarTime {
            day_of_year: 172,
            hour: 1.0,
        };
        let flux = net_surface_flux(&weather, &site(), &time, 0.5, 8.0);
        assert!(flux < 0.0);
    }

    #[test]
    fn more_ground_cover_loses_more_heat() {
        let weather = Weather {
            air_temp: 25.0,
            relative_humidity: 0.3,
            wind_speed: 3.0,
            beam_solar: 600.0,
        };
        let bare = net_surface_flux(&weather, &site(), &summer_noon(), 0.0, 20.0);
        let grass = net_surface_flux(&weather, &site(), &summer_noon(), 1.0, 20.0);
        assert!(grass < bare);
    }

    #[test]
    fn clear_sky_ratio_stays_clamped() {
        let s = site();
        for hour in 0..24 {
            let time = SolarTime {
                day_of_year: 30,
                hour: hour as Real,
            };
            for solar in [0.0, 200.0, 1200.0] {
                let ratio = clear_sky_ratio(solar * CONVERT_WM2_TO_MJHRMIN, &s, &time);
                assert!((0.3..=1.0).contains(&ratio), "ratio {ratio} out of range");
                assert!(ratio.is_finite());
            }
        }
    }
}
