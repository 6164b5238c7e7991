//! Material definitions

use serde::{Deserialize, Serialize};

use crate::jobdata::{real, reals, JobContext, JobData};

/// Engineering constants of an orthotropic material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orthotropic {
    pub ex: f64,
    pub ey: f64,
    pub ez: f64,
    pub vxy: f64,
    pub vyz: f64,
    pub vzx: f64,
    pub gxy: f64,
    pub gyz: f64,
    pub gzx: f64,
}

/// Constitutive behaviour of a material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Linear elastic, isotropic
    ElasticIsotropic { e: f64, v: f64 },
    /// Linear elastic, orthotropic
    ElasticOrthotropic(Orthotropic),
    /// Isotropic elastic with a plastic hardening curve of
    /// `(stress, plastic strain)` pairs
    ElasticPlastic {
        e: f64,
        v: f64,
        strain_stress: Vec<(f64, f64)>,
    },
    /// Bilinear steel: yield `fy`, ultimate `fu` at strain `eu`
    Steel {
        e: f64,
        v: f64,
        fy: f64,
        fu: f64,
        eu: f64,
    },
}

/// A named material. Names are unique within a part and across a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// Mass density
    pub density: f64,
    /// Thermal expansion coefficient (optional)
    pub expansion: Option<f64>,
    pub kind: MaterialKind,
}

impl Material {
    pub fn new(name: impl Into<String>, density: f64, kind: MaterialKind) -> Self {
        Self {
            name: name.into(),
            density,
            expansion: None,
            kind,
        }
    }

    /// Isotropic elastic material from E and v
    pub fn elastic_isotropic(name: impl Into<String>, e: f64, v: f64, density: f64) -> Self {
        Self::new(name, density, MaterialKind::ElasticIsotropic { e, v })
    }

    pub fn elastic_orthotropic(name: impl Into<String>, constants: Orthotropic, density: f64) -> Self {
        Self::new(name, density, MaterialKind::ElasticOrthotropic(constants))
    }

    pub fn elastic_plastic(
        name: impl Into<String>,
        e: f64,
        v: f64,
        density: f64,
        strain_stress: Vec<(f64, f64)>,
    ) -> Self {
        Self::new(
            name,
            density,
            MaterialKind::ElasticPlastic { e, v, strain_stress },
        )
    }

    /// Bilinear steel. `fu` defaults to `fy` (perfectly plastic).
    pub fn steel(
        name: impl Into<String>,
        e: f64,
        v: f64,
        density: f64,
        fy: f64,
        fu: Option<f64>,
        eu: f64,
    ) -> Self {
        let fu = fu.unwrap_or(fy);
        Self::new(name, density, MaterialKind::Steel { e, v, fy, fu, eu })
    }

    /// Structural steel S355 in SI units (Pa, kg/m³)
    pub fn steel_s355(name: impl Into<String>) -> Self {
        Self::steel(name, 210e9, 0.3, 7850.0, 355e6, None, 0.2)
    }

    pub fn with_expansion(mut self, alpha: f64) -> Self {
        self.expansion = Some(alpha);
        self
    }

    /// Young's modulus for isotropic kinds
    pub fn youngs_modulus(&self) -> Option<f64> {
        match &self.kind {
            MaterialKind::ElasticIsotropic { e, .. }
            | MaterialKind::ElasticPlastic { e, .. }
            | MaterialKind::Steel { e, .. } => Some(*e),
            MaterialKind::ElasticOrthotropic(_) => None,
        }
    }

    pub fn poisson_ratio(&self) -> Option<f64> {
        match &self.kind {
            MaterialKind::ElasticIsotropic { v, .. }
            | MaterialKind::ElasticPlastic { v, .. }
            | MaterialKind::Steel { v, .. } => Some(*v),
            MaterialKind::ElasticOrthotropic(_) => None,
        }
    }

    /// Shear modulus G = E / (2 (1 + v)) for isotropic kinds
    pub fn shear_modulus(&self) -> Option<f64> {
        let e = self.youngs_modulus()?;
        let v = self.poisson_ratio()?;
        Some(e / (2.0 * (1.0 + v)))
    }

    /// Plastic hardening table as `(stress, plastic strain)` rows
    pub fn plastic_table(&self) -> Option<Vec<(f64, f64)>> {
        match &self.kind {
            MaterialKind::ElasticPlastic { strain_stress, .. } => Some(strain_stress.clone()),
            MaterialKind::Steel { e, fy, fu, eu, .. } => {
                let ep = eu - fy / e;
                Some(vec![(*fy, 0.0), (*fu, ep)])
            }
            _ => None,
        }
    }
}

impl JobData for Material {
    fn jobdata(&self, _ctx: &JobContext<'_>) -> String {
        let mut out = format!("*Material, name={}\n*Density\n{},\n", self.name, real(self.density));
        match &self.kind {
            MaterialKind::ElasticOrthotropic(c) => {
                out.push_str("*Elastic, type=ENGINEERING CONSTANTS\n");
                // solver order E1 E2 E3 v12 v13 v23 G12 G13 / G23, with v13 = vzx Ex / Ez
                let vxz = c.vzx * c.ex / c.ez;
                out.push_str(&reals(&[c.ex, c.ey, c.ez, c.vxy, vxz, c.vyz, c.gxy, c.gzx]));
                out.push_str(&format!("\n{},\n", real(c.gyz)));
            }
            _ => {
                // isotropic kinds always carry E and v
                if let (Some(e), Some(v)) = (self.youngs_modulus(), self.poisson_ratio()) {
                    out.push_str(&format!("*Elastic\n{}\n", reals(&[e, v])));
                }
            }
        }
        if let Some(table) = self.plastic_table() {
            out.push_str("*Plastic\n");
            for (stress, strain) in table {
                out.push_str(&format!("{}\n", reals(&[stress, strain])));
            }
        }
        if let Some(alpha) = self.expansion {
            out.push_str(&format!("*Expansion\n{},\n", real(alpha)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_isotropic_shear_modulus() {
        let mat = Material::elastic_isotropic("steel", 200e9, 0.25, 7850.0);
        assert_relative_eq!(mat.shear_modulus().unwrap(), 80e9);
    }

    #[test]
    fn test_orthotropic_has_no_single_modulus() {
        let mat = Material::elastic_orthotropic(
            "timber",
            Orthotropic {
                ex: 11e9,
                ey: 0.37e9,
                ez: 0.37e9,
                vxy: 0.4,
                vyz: 0.4,
                vzx: 0.02,
                gxy: 0.69e9,
                gyz: 0.05e9,
                gzx: 0.69e9,
            },
            420.0,
        );
        assert!(mat.youngs_modulus().is_none());
        assert!(mat.shear_modulus().is_none());
    }

    #[test]
    fn test_steel_plastic_table() {
        let mat = Material::steel_s355("S355");
        let table = mat.plastic_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_relative_eq!(table[0].0, 355e6);
        assert_relative_eq!(table[1].0, 355e6);
        assert_relative_eq!(table[1].1, 0.2 - 355e6 / 210e9);
    }

    #[test]
    fn test_material_jobdata() {
        let model = crate::model::Model::new("m");
        let problem = crate::problem::Problem::new("p");
        let ctx = JobContext::new(&model, &problem);
        let mat = Material::elastic_isotropic("steel", 210e9, 0.3, 7850.0).with_expansion(1.2e-5);
        assert_eq!(
            mat.jobdata(&ctx),
            "*Material, name=steel\n*Density\n7850,\n*Elastic\n210000000000, 0.3\n*Expansion\n0.000012,\n"
        );
        let text = Material::steel_s355("S355").jobdata(&ctx);
        assert!(text.contains("*Plastic\n355000000, 0\n"));
    }

    #[test]
    fn test_orthotropic_jobdata_uses_vxz() {
        let model = crate::model::Model::new("m");
        let problem = crate::problem::Problem::new("p");
        let ctx = JobContext::new(&model, &problem);
        let mat = Material::elastic_orthotropic(
            "ply",
            Orthotropic {
                ex: 10.0,
                ey: 20.0,
                ez: 40.0,
                vxy: 0.25,
                vyz: 0.75,
                vzx: 0.5,
                gxy: 1.0,
                gyz: 2.0,
                gzx: 3.0,
            },
            1.0,
        );
        assert!(mat.jobdata(&ctx).contains(
            "*Elastic, type=ENGINEERING CONSTANTS\n10, 20, 40, 0.25, 0.125, 0.75, 1, 3\n2,\n"
        ));
    }
}
