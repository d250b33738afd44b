use std::fs;
use std::path::Path;
use csv::Writer;

use crate::cluster::ClusterItem;
use crate::errors::Result;

/// Write one row per cluster to `<output_dir>/clusters/<filename>.csv`
pub fn write_clusters_csv<P: AsRef<Path>>(
    clusters: &[ClusterItem],
    output_dir: P,
    filename: &str,
) -> Result<()> {
    let output_path = output_dir.as_ref().join("clusters").join(format!("{}.csv", filename));

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = Writer::from_path(&output_path)?;
    write_clusters(&mut writer, clusters)?;
    writer.flush()?;

    Ok(())
}

/// Header plus one record per cluster
pub fn write_clusters<W: std::io::Write>(writer: &mut Writer<W>, clusters: &[ClusterItem]) -> Result<()> {
    writer.write_record([
        "Id",
        "Mass",
        "SumX",
        "SumY",
        "Cx",
        "Cy",
        "fCx",
        "fCy",
    ])?;

    for item in clusters {
        writer.write_record(&[
            item.id.to_string(),
            item.mass.to_string(),
            item.sum_x.to_string(),
            item.sum_y.to_string(),
            item.cx.to_string(),
            item.cy.to_string(),
            format!("{:.6}", item.fcx),
            format!("{:.6}", item.fcy),
        ])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary_image::BinaryImage;
    use crate::cluster::Cluster;
    use crate::pixel::Mono8;

    #[test]
    fn csv_rows_follow_cluster_order() {
        let mut mask = BinaryImage::with_size(8, 8);
        mask.fill(Mono8::from(0));
        mask.set_plant(2, 2, 0, 1);
        mask.set_plant(3, 2, 0, 1);
        mask.set_plant(5, 5, 0, 1);
        let mut cluster = Cluster::new();
        cluster.clusterize(&mask);

        let mut writer = Writer::from_writer(Vec::new());
        write_clusters(&mut writer, cluster.clusters()).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Id,Mass,SumX,SumY,Cx,Cy,fCx,fCy");
        assert_eq!(lines[1], "0,2,5,4,2,2,2.500000,2.000000");
        assert_eq!(lines[2], "1,1,5,5,5,5,5.000000,5.000000");
        assert_eq!(lines.len(), 3);
    }
}
