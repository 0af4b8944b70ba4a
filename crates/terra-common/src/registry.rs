//! Static dataset catalog.
//!
//! The catalog is built once at process start and never mutated. Lookups are
//! a linear scan across categories in declaration order; when two descriptors
//! share an identifier the first one wins.

use chrono::NaiveDate;

use crate::dataset::{DatasetCategory, DatasetDescriptor};

/// Category holding the default dataset for the viewer.
pub const DEFAULT_CATEGORY: &str = "climate";

/// Ordered collection of dataset categories.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    categories: Vec<DatasetCategory>,
}

impl Registry {
    pub fn new(categories: Vec<DatasetCategory>) -> Self {
        Self { categories }
    }

    /// The built-in catalog. `today` closes the date ranges of the datasets
    /// that are still being updated and is the GFS default date.
    pub fn builtin(today: NaiveDate) -> Self {
        let climate = vec![
            DatasetDescriptor::new(
                "NASA/ORNL/DAYMET_V4",
                "DAYMET V4 - Données Climatiques Quotidiennes",
                "Données météorologiques quotidiennes à résolution 1km pour l'Amérique du Nord.",
            )
            .with_variable("tmax", "Température maximale (°C)")
            .with_variable("tmin", "Température minimale (°C)")
            .with_variable("prcp", "Précipitations (mm/jour)")
            .with_variable("srad", "Rayonnement solaire (W/m²)")
            .with_variable("vp", "Pression de vapeur (Pa)")
            .with_variable("swe", "Équivalent en eau de neige (kg/m²)")
            .with_variable("dayl", "Durée du jour (s)")
            .with_default_date(ymd(2020, 7, 15))
            .with_date_range(ymd(1980, 1, 1), ymd(2021, 12, 31))
            .with_region(-140.0, 15.0, -60.0, 60.0)
            .with_view(3, -100.0, 40.0),
            DatasetDescriptor::new(
                "NOAA/GFS0P25",
                "NOAA GFS - Prévisions Météorologiques Globales",
                "Système de prévision global (GFS) de la NOAA avec résolution 0.25 degrés.",
            )
            .with_variable("temperature_2m_above_ground", "Température à 2m (K)")
            .with_variable(
                "u_component_of_wind_10m_above_ground",
                "Vent - composante U à 10m (m/s)",
            )
            .with_variable(
                "v_component_of_wind_10m_above_ground",
                "Vent - composante V à 10m (m/s)",
            )
            .with_variable("relative_humidity_2m_above_ground", "Humidité relative à 2m (%)")
            .with_variable("total_precipitation_surface", "Précipitations totales (kg/m²)")
            .with_default_date(today)
            .with_date_range(ymd(2015, 1, 1), today)
            .with_region(-180.0, -90.0, 180.0, 90.0)
            .with_view(2, 0.0, 0.0),
        ];

        let weather = vec![
            DatasetDescriptor::new(
                "UCSB-CHG/CHIRPS/DAILY",
                "CHIRPS - Précipitations Quotidiennes",
                "Ensemble de données de précipitations infrarouge à haute résolution.",
            )
            .with_variable("precipitation", "Précipitations (mm/jour)")
            .with_default_date(ymd(2020, 1, 15))
            .with_date_range(ymd(1981, 1, 1), today)
            .with_region(-30.0, -35.0, 60.0, 35.0)
            .with_view(2, 17.93, 7.71),
            DatasetDescriptor::new(
                "NOAA/GOES/16/MCMIPC",
                "NOAA GOES-16 - Imagerie Satellite",
                "Données d'imagerie du satellite GOES-16 (Hémisphère Occidental).",
            )
            .with_variable("CMI_C01", "Canal Bleu")
            .with_variable("CMI_C02", "Canal Rouge")
            .with_variable("CMI_C03", "Canal Végétation")
            .with_variable("CMI_C13", "Canal Infrarouge")
            .with_default_date(ymd(2022, 1, 1))
            .with_date_range(ymd(2017, 1, 1), today)
            .with_region(-100.0, 10.0, -50.0, 45.0)
            .with_view(3, -75.0, 37.0),
        ];

        let terrain = vec![
            DatasetDescriptor::new(
                "USGS/SRTMGL1_003",
                "SRTM - Modèle Numérique de Terrain 30m",
                "Modèle d'élévation global à haute résolution (30m) de la mission SRTM.",
            )
            .with_variable("elevation", "Élévation (m)")
            .with_region(-120.0, 25.0, -70.0, 50.0)
            .with_view(4, -95.0, 38.0),
            DatasetDescriptor::new(
                "USGS/GTOPO30",
                "GTOPO30 - Modèle Numérique de Terrain Global",
                "Modèle d'élévation global (résolution ~1km).",
            )
            .with_variable("elevation", "Élévation (m)")
            .with_region(-180.0, -60.0, 180.0, 85.0)
            .with_view(2, 0.0, 20.0),
        ];

        Self::new(vec![
            DatasetCategory::new("climate", "Climat", climate),
            DatasetCategory::new("weather", "Météo", weather),
            DatasetCategory::new("terrain", "Terrain", terrain),
        ])
    }

    /// Find a dataset by identifier.
    pub fn find(&self, dataset_id: &str) -> Option<&DatasetDescriptor> {
        self.datasets().find(|d| d.id == dataset_id)
    }

    pub fn categories(&self) -> &[DatasetCategory] {
        &self.categories
    }

    /// All datasets in category order.
    pub fn datasets(&self) -> impl Iterator<Item = &DatasetDescriptor> {
        self.categories.iter().flat_map(|c| c.datasets.iter())
    }

    /// First climate dataset, or the first dataset overall.
    pub fn default_dataset(&self) -> Option<&DatasetDescriptor> {
        self.categories
            .iter()
            .find(|c| c.id == DEFAULT_CATEGORY)
            .and_then(|c| c.datasets.first())
            .or_else(|| self.datasets().next())
    }

    pub fn len(&self) -> usize {
        self.datasets().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("catalog dates are valid calendar dates")
}
